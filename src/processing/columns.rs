//! Static column tables for the cleaning pipeline.

/// Raw columns with too few values, or internal bookkeeping
pub const DROP_COLUMNS: &[&str] = &[
    "Agua",
    "Calle alumbrada",
    "Calle asfaltada",
    "Carpintería exterior",
    "Carpintería interior",
    "Comedor",
    "Gas",
    "Interior",
    "Lavadero",
    "Luz",
    "No se aceptan mascotas",
    "page_source",
    "Portero automático",
    "Referencia",
    "scrape_status",
    "Se aceptan mascotas",
    "Soleado",
    "Superficie solar",
    "Teléfono",
    "Tipo de casa",
    "Tipo suelo",
    "Urbanizado",
];

/// Raw column name -> processed column name
pub const RENAME: &[(&str, &str)] = &[
    ("property_native_id", "property_id"),
    ("scraped_timestamp", "scraped_at"),
    ("energy_certificate_main_classification", "energy_cert_classification"),
    ("rent_eur_per_month", "price_eur"),
    ("Adaptado a personas con movilidad reducida", "adaptado_movilidad_reducida"),
    ("Aire acondicionado", "aire_acondicionado"),
    ("Amueblado", "amueblado"),
    ("Antigüedad", "antiguedad"),
    ("Armarios empotrados", "armarios_empotrados"),
    ("Ascensor", "ascensor"),
    ("Balcón", "balcon"),
    ("Baños", "banos"),
    ("Calefacción", "calefaccion"),
    ("Chimenea", "chimenea"),
    ("Cocina equipada", "cocina_equipada"),
    ("Conservación", "conservacion"),
    ("Exterior", "exterior"),
    ("Garaje", "garaje"),
    ("Gastos de comunidad", "gastos_comunidad"),
    ("Habitaciones", "habitaciones"),
    ("Jardín", "jardin"),
    ("Orientación", "orientacion"),
    ("Piscina", "piscina"),
    ("Planta", "planta"),
    ("Puerta blindada", "puerta_blindada"),
    ("Sistema de seguridad", "sistema_seguridad"),
    ("Superficie construida", "superficie_construida"),
    ("Superficie útil", "superficie_util"),
    ("Terraza", "terraza"),
    ("Trastero", "trastero"),
    ("Vidrios dobles", "vidrios_dobles"),
];

/// Columns read as-is or parsed by the pipeline, besides the renamed ones
pub const PASSTHROUGH_COLUMNS: &[&str] = &[
    "url",
    "price_eur",
    "barrio",
    "distrito",
    "latitude",
    "longitude",
    "description",
    "energy_consumption_rating",
    "energy_consumption_value",
    "energy_emissions_rating",
    "energy_emissions_value",
];

/// Building age, oldest = 0
pub const ANTIQUITY_SCALE: &[(&str, f64)] = &[
    ("más de 50 años", 0.0),
    ("entre 30 y 50 años", 1.0),
    ("entre 20 y 30 años", 2.0),
    ("entre 10 y 20 años", 3.0),
    ("entre 5 y 10 años", 4.0),
    ("menos de 5 años", 5.0),
];

/// Condition, worst = 0
pub const CONDITION_SCALE: &[(&str, f64)] = &[
    ("a reformar", 0.0),
    ("en buen estado", 1.0),
    ("reformado", 2.0),
    ("a estrenar", 3.0),
];

/// Named floors, checked in order before falling back to the first integer
pub const FLOOR_RULES: &[(&str, f64)] = &[
    ("bajo", 0.0),
    ("semisótano", -1.0),
    ("entresuelo", 0.5),
    ("principal", 1.0),
    ("más de 20", 21.0),
];

pub const FURNISHED_NEGATIVE: &[&str] = &["no", "vacío", "vacio"];

/// Processed name for a raw column, if it is renamed
pub fn renamed(raw: &str) -> Option<&'static str> {
    RENAME.iter().find(|(from, _)| *from == raw).map(|(_, to)| *to)
}

/// Raw columns that feed a processed column
pub fn sources_of(processed: &'static str) -> impl Iterator<Item = &'static str> {
    RENAME
        .iter()
        .filter(move |(_, to)| *to == processed)
        .map(|(from, _)| *from)
        .chain(std::iter::once(processed))
}

pub fn is_consumed(raw: &str) -> bool {
    renamed(raw).is_some() || PASSTHROUGH_COLUMNS.contains(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rental_price_feeds_price_eur() {
        let sources: Vec<_> = sources_of("price_eur").collect();
        assert_eq!(sources, vec!["rent_eur_per_month", "price_eur"]);
    }

    #[test]
    fn drop_list_and_rename_map_do_not_overlap() {
        assert!(DROP_COLUMNS.iter().all(|c| !is_consumed(c)));
    }
}
