use std::future::Future;
use std::pin::Pin;

use super::types::ImageHandle;
use crate::core::taste::{AestheticPlan, GenerationCandidate};
use crate::error::StudioError;

pub type StudioFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StudioError>> + Send + 'a>>;

/// Remote generator turning a candidate into a typographic plan and a
/// background image.
pub trait Studio: Send + Sync {
    /// Studio identifier (e.g. "gemini").
    fn name(&self) -> &str;

    fn plan_aesthetic<'a>(
        &'a self,
        candidate: &'a GenerationCandidate,
    ) -> StudioFuture<'a, AestheticPlan>;

    fn generate_image<'a>(
        &'a self,
        candidate: &'a GenerationCandidate,
        plan: &'a AestheticPlan,
    ) -> StudioFuture<'a, ImageHandle>;

    /// Polish free text into a short quote.
    fn refine_quote<'a>(&'a self, quote: &'a str) -> StudioFuture<'a, String>;
}
