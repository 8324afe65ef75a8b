pub mod atelier;
pub mod dispatch;
pub mod status;

pub use atelier::{
    Atelier, Choice, ChoiceOutcome, Creation, RenderedOption, RoundOverrides, RoundPair,
};
