use guidedb_core::Embedder;
use guidedb_embed::get_default_embedder;

// Usage: APP_USE_FAKE_EMBEDDINGS=1 cargo run -p guidedb-embed --example embed -- "some text"
fn main() -> anyhow::Result<()> {
    let text = std::env::args().nth(1).unwrap_or_else(|| "aortic root dilation".to_string());
    let embedder = get_default_embedder()?;
    let v = embedder.embed(&text)?;
    println!("{} -> {} dims, first: {:?}", embedder.embedder_id(), v.len(), &v[..v.len().min(8)]);
    Ok(())
}
