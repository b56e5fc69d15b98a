use serde::{Deserialize, Serialize};

/// One row of the processed table. Field order is the CSV column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedPropertyRow {
    pub url: Option<String>,
    pub property_id: Option<String>,
    pub price_eur: i64,
    pub barrio: Option<String>,
    pub distrito: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub scraped_at: Option<String>,
    pub description: Option<String>,
    pub energy_cert_classification: Option<String>,
    pub energy_consumption_rating: Option<String>,
    pub energy_emissions_rating: Option<String>,
    pub energy_consumption_kwh_m2_yr: Option<f64>,
    pub energy_emissions_kg_co2_m2_yr: Option<f64>,
    pub antiguedad: Option<f64>,
    pub conservacion: Option<f64>,
    pub banos: Option<f64>,
    pub habitaciones: Option<f64>,
    pub superficie_construida: Option<f64>,
    pub superficie_util: Option<f64>,
    pub planta_numerica: Option<f64>,
    pub gastos_comunidad_eur: Option<f64>,
    pub amueblado: Option<bool>,
    pub orientacion_norte: bool,
    pub orientacion_sur: bool,
    pub orientacion_este: bool,
    pub orientacion_oeste: bool,
    pub adaptado_movilidad_reducida: bool,
    pub aire_acondicionado: bool,
    pub armarios_empotrados: bool,
    pub ascensor: bool,
    pub balcon: bool,
    pub calefaccion: bool,
    pub chimenea: bool,
    pub cocina_equipada: bool,
    pub exterior: bool,
    pub garaje: bool,
    pub jardin: bool,
    pub piscina: bool,
    pub puerta_blindada: bool,
    pub sistema_seguridad: bool,
    pub terraza: bool,
    pub trastero: bool,
    pub vidrios_dobles: bool,
}

pub type NumericField = fn(&mut ProcessedPropertyRow) -> &mut Option<f64>;

/// Nullable numeric columns, in CSV order
pub const NUMERIC_COLUMNS: &[(&str, NumericField)] = &[
    ("latitude", |r| &mut r.latitude),
    ("longitude", |r| &mut r.longitude),
    ("energy_consumption_kwh_m2_yr", |r| &mut r.energy_consumption_kwh_m2_yr),
    ("energy_emissions_kg_co2_m2_yr", |r| &mut r.energy_emissions_kg_co2_m2_yr),
    ("antiguedad", |r| &mut r.antiguedad),
    ("conservacion", |r| &mut r.conservacion),
    ("banos", |r| &mut r.banos),
    ("habitaciones", |r| &mut r.habitaciones),
    ("superficie_construida", |r| &mut r.superficie_construida),
    ("superficie_util", |r| &mut r.superficie_util),
    ("planta_numerica", |r| &mut r.planta_numerica),
    ("gastos_comunidad_eur", |r| &mut r.gastos_comunidad_eur),
];

pub type AmenityField = fn(&mut ProcessedPropertyRow) -> &mut bool;

/// Presence-only amenities, by processed column name
pub const AMENITY_COLUMNS: &[(&str, AmenityField)] = &[
    ("adaptado_movilidad_reducida", |r| &mut r.adaptado_movilidad_reducida),
    ("aire_acondicionado", |r| &mut r.aire_acondicionado),
    ("armarios_empotrados", |r| &mut r.armarios_empotrados),
    ("ascensor", |r| &mut r.ascensor),
    ("balcon", |r| &mut r.balcon),
    ("calefaccion", |r| &mut r.calefaccion),
    ("chimenea", |r| &mut r.chimenea),
    ("cocina_equipada", |r| &mut r.cocina_equipada),
    ("exterior", |r| &mut r.exterior),
    ("garaje", |r| &mut r.garaje),
    ("jardin", |r| &mut r.jardin),
    ("piscina", |r| &mut r.piscina),
    ("puerta_blindada", |r| &mut r.puerta_blindada),
    ("sistema_seguridad", |r| &mut r.sistema_seguridad),
    ("terraza", |r| &mut r.terraza),
    ("trastero", |r| &mut r.trastero),
    ("vidrios_dobles", |r| &mut r.vidrios_dobles),
];
