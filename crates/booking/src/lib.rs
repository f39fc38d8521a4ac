pub mod generator;
pub mod rates;
pub mod schedule_table;
pub mod telemetry;

pub use generator::{
    ArtifactOutcome, BookingDocumentGenerator, GenerateError, GenerateOptions, GenerationReport,
};
pub use rates::{RateQuote, RateService, RateSource};
pub use schedule_table::render_schedule_table;
pub use telemetry::init_logging;
