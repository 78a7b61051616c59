//! Column names and column sets of the listings table.
//!
//! The loader verifies the raw schema against [`REQUIRED_COLUMNS`]; every
//! later stage refers to columns through these constants rather than string
//! literals.

/// App display name.
pub const APP: &str = "App";
/// Marketplace category (closed, externally defined set).
pub const CATEGORY: &str = "Category";
/// Average user rating, 0.0 - 5.0.
pub const RATING: &str = "Rating";
/// Number of user reviews.
pub const REVIEWS: &str = "Reviews";
/// Package size in megabytes.
pub const SIZE_MBS: &str = "Size_MBs";
/// Install count, display-formatted until coerced ("1,000+").
pub const INSTALLS: &str = "Installs";
/// Listing type: Free or Paid.
pub const TYPE: &str = "Type";
/// Listing price, optionally "$"-prefixed until coerced.
pub const PRICE: &str = "Price";
/// Content rating label ("Everyone", "Teen", ...).
pub const CONTENT_RATING: &str = "Content_Rating";
/// Semicolon-delimited genre tags.
pub const GENRES: &str = "Genres";
/// Last update date; present in the source, dropped by the cleaner.
pub const LAST_UPDATED: &str = "Last_Updated";
/// Minimum OS version; present in the source, dropped by the cleaner.
pub const ANDROID_VER: &str = "Android_Ver";

/// Derived column: `Installs` x `Price`.
pub const REVENUE_ESTIMATE: &str = "Revenue_Estimate";

/// Back-reference column of the exploded genre table.
pub const SOURCE_ROW: &str = "Source_Row";
/// Single genre token column of the exploded genre table.
pub const GENRE: &str = "Genre";
/// Count column of frequency and group-count tables.
pub const COUNT: &str = "Count";
/// App-count column of the category concentration table.
pub const APPS: &str = "Apps";

/// Columns the loader requires in the raw input.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    APP,
    CATEGORY,
    RATING,
    REVIEWS,
    SIZE_MBS,
    INSTALLS,
    TYPE,
    PRICE,
    CONTENT_RATING,
    GENRES,
    LAST_UPDATED,
    ANDROID_VER,
];

/// Columns removed by the cleaner before any row-level work.
pub const DROPPED_COLUMNS: [&str; 2] = [LAST_UPDATED, ANDROID_VER];

/// Columns retained after the cleaner's projection.
pub const RETAINED_COLUMNS: [&str; 10] = [
    APP,
    CATEGORY,
    RATING,
    REVIEWS,
    SIZE_MBS,
    INSTALLS,
    TYPE,
    PRICE,
    CONTENT_RATING,
    GENRES,
];

/// Identity key for duplicate-listing detection, on raw (pre-coercion)
/// values.
pub const IDENTITY_KEY: [&str; 3] = [APP, TYPE, PRICE];
