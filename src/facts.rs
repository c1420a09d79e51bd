use rand::seq::SliceRandom;
use rand::Rng;

/// Shown while an image is being generated.
pub const FUN_FACTS: &[&str] = &[
    "Did you know? The first AI-generated artwork sold at Christie's auction house for $432,500 in 2018.",
    "AI image generators typically analyze millions of images to learn artistic styles.",
    "Some AI models can generate images in the style of famous artists like Van Gogh or Picasso.",
    "The most advanced AI image models can create photorealistic images from text descriptions.",
    "AI-generated images are created using neural networks called GANs or diffusion models.",
    "It takes massive computing power - some AI image models have billions of parameters!",
    "AI can now generate images faster than any human artist could paint them.",
    "Some AI models can edit existing images based on text prompts.",
    "The first AI-generated portrait was created in 2018 by Obvious, a Paris-based collective.",
    "AI art raises interesting questions about copyright and creativity.",
    "Modern AI can generate images in specific art styles like cyberpunk or watercolor.",
    "Some AI models can create 3D renders from 2D images.",
    "AI-generated images are used in movies, games, and advertising.",
    "The quality of AI-generated images improves dramatically each year.",
    "Some artists use AI as a creative tool to enhance their workflow.",
    "AI can generate variations on an image with different styles or compositions.",
    "The largest AI image models can understand and generate images from complex prompts.",
    "AI-generated images sometimes have surreal or unexpected elements.",
    "Some AI models can continue an image beyond its original borders.",
    "The future may bring AI that can generate animated scenes from text.",
];

pub fn random_fact<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    FUN_FACTS.choose(rng).copied().unwrap_or_default()
}
