pub mod catalog;
pub mod error;
pub mod export;
pub mod reagent;
pub mod recipe;
pub mod units;

pub use error::BufferError;
pub use reagent::{Catalog, Powder, Reagent, SourceType, StockItem, StockSolution};
pub use recipe::{
    compute_recipe, OutputUnits, RecipeBuilder, RecipeLine, RecipeResult, RecipeStep,
};
pub use units::{Concentration, ConcentrationKind, UnitFamily};
