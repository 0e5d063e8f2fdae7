//! Photo editing example - applies a prompt to an existing photo.
//!
//! Run with: `cargo run --example edit -- <input.png> [aspect_ratio]`
//!
//! Requires `GEMINI_API_KEY` environment variable.

use fotogen::{AspectRatio, GeminiClient, Studio, Tool};

#[tokio::main]
async fn main() -> fotogen::Result<()> {
    let input_path = std::env::args()
        .nth(1)
        .expect("Usage: edit <input.png> [aspect_ratio]");
    let aspect_ratio = std::env::args()
        .nth(2)
        .map(|s| s.parse::<AspectRatio>())
        .transpose()
        .expect("aspect ratio must be one of 1:1, 16:9, 9:16, 4:3, 3:4")
        .unwrap_or_default();

    let mut studio = Studio::new(GeminiClient::new());
    studio.select_tool(Tool::Edit);
    studio.upload_file(&input_path)?;
    studio.set_prompt("Make the colors more vibrant and add a warm sunset glow");
    studio.set_aspect_ratio(aspect_ratio);

    let image = studio.submit().await?;
    image.save("edited.png")?;
    println!("Edited image saved to edited.png ({} bytes)", image.size());

    Ok(())
}
