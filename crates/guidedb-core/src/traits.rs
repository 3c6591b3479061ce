use crate::error::Result;

/// Maps a text to a fixed-length vector.
///
/// Implementations must return vectors of the same length for every call
/// made through one `embedder_id`.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `openai:text-embedding-3-large`).
    fn embedder_id(&self) -> &str;
    /// Dimensionality, when known before the first call.
    fn dim(&self) -> Option<usize>;
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn embedder_id(&self) -> &str { (**self).embedder_id() }
    fn dim(&self) -> Option<usize> { (**self).dim() }
    fn embed(&self, text: &str) -> Result<Vec<f32>> { (**self).embed(text) }
}

/// Adapts a plain function or closure into an [`Embedder`].
pub struct FnEmbedder<F> {
    id: String,
    dim: Option<usize>,
    f: F,
}

impl<F> FnEmbedder<F>
where
    F: Fn(&str) -> Result<Vec<f32>> + Send + Sync,
{
    pub fn new(id: impl Into<String>, f: F) -> Self {
        Self { id: id.into(), dim: None, f }
    }

    pub fn with_dim(mut self, dim: usize) -> Self {
        self.dim = Some(dim);
        self
    }
}

impl<F> Embedder for FnEmbedder<F>
where
    F: Fn(&str) -> Result<Vec<f32>> + Send + Sync,
{
    fn embedder_id(&self) -> &str { &self.id }
    fn dim(&self) -> Option<usize> { self.dim }
    fn embed(&self, text: &str) -> Result<Vec<f32>> { (self.f)(text) }
}
