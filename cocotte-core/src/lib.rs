pub mod audit;
pub mod cache;
pub mod collaborators;
pub mod config;
pub mod duration;
pub mod enrichment;
pub mod error;
pub mod graph;
pub mod references;
pub mod seasonality;
pub mod storage;
pub mod timing;
pub mod types;
pub mod validation;
pub mod weights;

pub use audit::{audit_directory, audit_file, AuditReport, FileAudit};
pub use cache::{CacheError, CacheStats, EnrichmentCache};
pub use collaborators::{
    create_collaborators, CollaboratorError, Collaborators, FakeMatcher, FakeTranslator,
    IngredientTranslator, NutrientProfile, NutritionMatcher,
};
pub use config::{CocotteConfig, ConfigError};
pub use duration::{minutes_to_iso8601, parse_duration};
pub use enrichment::{EnrichOptions, EnrichmentError, RecipeEnricher};
pub use error::RecipeError;
pub use graph::StepGraph;
pub use references::{correct_step_references, fuzzy_match_id, make_ingredient_id, CorrectionReport};
pub use storage::{load_document, load_recipe, recipe_files, save_document, slugify};
pub use timing::{
    calculate_linear_times, calculate_times_from_dag, RecipeTimes, TimingOptions,
};
pub use types::{
    Diet, Difficulty, Ingredient, IngredientCategory, NutritionConfidence, NutritionPerServing,
    RecipeDocument, RecipeMetadata, RecipeType, Season, Step, StepType, Unit,
};
pub use validation::{validate, Recipe, Severity, Violation, ViolationCategory};
