use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;

use crate::cli::utils::{output_empty_collection, output_fact, output_facts};
use crate::cli::CliContext;
use crate::client::{HttpTextGenerator, DEFAULT_PROMPT};

#[derive(Subcommand)]
pub enum DataCommands {
    #[command(about = "List your most recent facts")]
    List,

    #[command(about = "Save a fact")]
    Add {
        #[arg(help = "Fact text")]
        text: String,
    },

    #[command(about = "Generate a fact with the text generator and save it")]
    Generate {
        #[arg(long, env = "FACTS_GENERATOR_URL", help = "Text generation endpoint")]
        generator_url: String,
        #[arg(long, default_value = DEFAULT_PROMPT, help = "Prompt sent to the generator")]
        prompt: String,
        #[arg(long, default_value_t = 30, help = "Generation timeout in seconds")]
        timeout: u64,
    },
}

pub async fn handle(cmd: DataCommands, ctx: &CliContext) -> anyhow::Result<()> {
    match cmd {
        DataCommands::List => {
            let controller = ctx.signed_in_controller().await?;
            let facts = controller.refresh_facts().await?;

            if facts.is_empty() {
                return output_empty_collection(&ctx.output_format, "facts", "No facts saved yet");
            }
            output_facts(&ctx.output_format, &facts)
        }
        DataCommands::Add { text } => {
            let controller = ctx.signed_in_controller().await?;
            let fact = controller.save_fact(&text).await?;
            output_fact(&ctx.output_format, "Saved fact", &fact)
        }
        DataCommands::Generate { generator_url, prompt, timeout } => {
            let generator = HttpTextGenerator::new(&generator_url, Duration::from_secs(timeout))?;
            let controller = ctx
                .signed_in_controller()
                .await?
                .with_generator(Arc::new(generator));

            let draft = controller.generate_draft(&prompt).await?;
            tracing::debug!("Generated draft: {}", draft);
            let fact = controller.save_draft().await?;
            output_fact(&ctx.output_format, "Generated and saved fact", &fact)
        }
    }
}
