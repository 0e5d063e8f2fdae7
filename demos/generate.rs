//! Basic photo generation example.
//!
//! Run with: `cargo run --example generate`
//!
//! Requires `GEMINI_API_KEY` environment variable.

use fotogen::{AspectRatio, GeminiClient, Studio};

#[tokio::main]
async fn main() -> fotogen::Result<()> {
    let mut studio = Studio::new(GeminiClient::new());

    studio.set_prompt("A golden retriever puppy playing in snow");
    studio.set_aspect_ratio(AspectRatio::Landscape);

    let image = studio.submit().await?;
    image.save("output.png")?;
    println!(
        "Generated image: {} bytes, format: {:?}",
        image.size(),
        image.format
    );

    Ok(())
}
