use clap::Parser;

/// Publish an AI-generated code snippet of the day to a GitHub repository.
///
/// All settings come from the environment (GITHUB_TOKEN, OPENAI_API_KEY,
/// CODEDAY_REPO_OWNER, ...).
#[derive(Parser)]
#[command(name = "codeday")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
