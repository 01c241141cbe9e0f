//! Canonical column names shared across the pipeline stages, plus the
//! source-file names they are renamed from during ingestion.

// Canonical (post-normalization)
pub const COL_LOCATION_ID: &str = "location_id";
pub const COL_DATE: &str = "date";
pub const COL_YEAR: &str = "year";
pub const COL_MONTH: &str = "month";
pub const COL_TEMP_MEAN: &str = "temp_mean";
pub const COL_TEMP_MAX: &str = "temp_max";
pub const COL_TEMP_MIN: &str = "temp_min";
pub const COL_PRECIP_TOTAL: &str = "precip_total";

// As they appear in the input file
pub const SOURCE_LOCATION_ID: &str = "STATE";
pub const SOURCE_DATE: &str = "Date";
pub const SOURCE_TEMP_MEAN: &str = "temperature_2m_MEAN";
pub const SOURCE_TEMP_MAX: &str = "temperature_2m_max_MEAN";
pub const SOURCE_TEMP_MIN: &str = "temperature_2m_min_MEAN";
pub const SOURCE_PRECIP_TOTAL: &str = "total_precipitation_sum_MEAN";

pub const BIO01: &str = "bio01";
pub const BIO02: &str = "bio02";
pub const BIO03: &str = "bio03";
pub const BIO04: &str = "bio04";
pub const BIO05: &str = "bio05";
pub const BIO06: &str = "bio06";
pub const BIO07: &str = "bio07";
pub const BIO08: &str = "bio08";
pub const BIO09: &str = "bio09";
pub const BIO10: &str = "bio10";
pub const BIO11: &str = "bio11";
pub const BIO12: &str = "bio12";
pub const BIO13: &str = "bio13";
pub const BIO14: &str = "bio14";
pub const BIO15: &str = "bio15";
pub const BIO16: &str = "bio16";
pub const BIO17: &str = "bio17";
pub const BIO18: &str = "bio18";
pub const BIO19: &str = "bio19";

/// The nineteen index columns in output order.
pub const BIO_COLUMNS: [&str; 19] = [
    BIO01, BIO02, BIO03, BIO04, BIO05, BIO06, BIO07, BIO08, BIO09, BIO10, BIO11, BIO12, BIO13,
    BIO14, BIO15, BIO16, BIO17, BIO18, BIO19,
];

/// Source columns that must be present in the input file, paired with the
/// canonical name each one is renamed to.
pub const SOURCE_COLUMN_MAP: [(&str, &str); 6] = [
    (SOURCE_LOCATION_ID, COL_LOCATION_ID),
    (SOURCE_DATE, COL_DATE),
    (SOURCE_TEMP_MEAN, COL_TEMP_MEAN),
    (SOURCE_TEMP_MAX, COL_TEMP_MAX),
    (SOURCE_TEMP_MIN, COL_TEMP_MIN),
    (SOURCE_PRECIP_TOTAL, COL_PRECIP_TOTAL),
];

/// Offset between Kelvin and Celsius.
pub const KELVIN_OFFSET: f64 = 273.15;
