//! `/ocr-test`: OCR a betting slip attachment and reply with the structured
//! report.

use anyhow::{Context as _, Result, anyhow};
use async_trait::async_trait;
use serenity::all::{
    Attachment, CommandInteraction, CommandOptionType, Context, CreateAttachment, CreateCommand,
    CreateCommandOption, EditInteractionResponse, ResolvedValue,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::cleanup::{RequestFiles, schedule_cleanup};
use super::commands::SlashCommand;
use super::download::download_image;
use super::reply::{self, OcrReply, build_reply};
use crate::config::AppConfig;
use crate::ocr::{OcrOutput, preprocess_image, recognize};
use crate::progress::{ProgressThrottle, progress_channel};
use crate::slip::analyze;

const NAME: &str = "ocr-test";
const IMAGE_OPTION: &str = "image";

pub struct OcrTestCommand {
    config: Arc<AppConfig>,
    http: reqwest::Client,
}

impl OcrTestCommand {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    async fn edit(
        &self,
        ctx: &Context,
        command: &CommandInteraction,
        content: impl Into<String>,
    ) -> Result<()> {
        command
            .edit_response(&ctx.http, EditInteractionResponse::new().content(content))
            .await
            .context("Failed to edit reply")?;
        Ok(())
    }

    /// Download → preprocess → OCR → structure → reply.
    async fn run(
        &self,
        ctx: &Context,
        command: &CommandInteraction,
        attachment: &Attachment,
        files: &RequestFiles,
    ) -> Result<()> {
        tokio::fs::create_dir_all(&self.config.temp_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.config.temp_dir.display()))?;

        self.edit(ctx, command, reply::DOWNLOADING).await?;
        download_image(&self.http, &attachment.url, &files.download).await?;

        self.edit(ctx, command, reply::PREPROCESSING).await?;
        let image_path = {
            let (input, output) = (files.download.clone(), files.processed.clone());
            let preprocess = self.config.preprocess.clone();
            tokio::task::spawn_blocking(move || preprocess_image(&input, &output, &preprocess))
                .await?
        };

        self.edit(ctx, command, reply::ocr_progress(0)).await?;
        let output = self.recognize_with_progress(ctx, command, image_path).await?;

        self.edit(ctx, command, reply::PROCESSING).await?;
        let analysis = analyze(&output);
        let report = analysis.structured().render();

        match build_reply(
            analysis.confidence,
            analysis.words.len(),
            &report,
            self.config.inline_reply_limit,
        ) {
            OcrReply::Inline(message) => self.edit(ctx, command, message).await?,
            OcrReply::Attachment { content, report } => {
                tokio::fs::write(&files.result, report)
                    .await
                    .with_context(|| format!("Failed to write {}", files.result.display()))?;
                let file = CreateAttachment::path(&files.result).await?;
                command
                    .edit_response(
                        &ctx.http,
                        EditInteractionResponse::new()
                            .content(content)
                            .new_attachment(file),
                    )
                    .await
                    .context("Failed to send result file")?;
            }
        }

        Ok(())
    }

    /// Runs Tesseract on a blocking thread while a forwarder task turns
    /// progress events into throttled reply edits.
    async fn recognize_with_progress(
        &self,
        ctx: &Context,
        command: &CommandInteraction,
        image_path: PathBuf,
    ) -> Result<OcrOutput> {
        let (sink, mut events) = progress_channel();

        let http = ctx.http.clone();
        let interaction = command.clone();
        let mut throttle = ProgressThrottle::new(self.config.progress_step);
        let forwarder = tokio::spawn(async move {
            while let Some(percent) = events.recv().await {
                if !throttle.accept(percent) {
                    continue;
                }
                let edit = EditInteractionResponse::new().content(reply::ocr_progress(percent));
                if let Err(e) = interaction.edit_response(&http, edit).await {
                    tracing::debug!("Progress update dropped: {}", e);
                }
            }
        });

        let ocr_config = self.config.ocr.clone();
        let result =
            tokio::task::spawn_blocking(move || recognize(&image_path, &ocr_config, &sink)).await;

        // The sink was dropped with the blocking closure, so the forwarder
        // drains and stops.
        if let Err(e) = forwarder.await {
            tracing::debug!("Progress forwarder ended abnormally: {}", e);
        }

        result?
    }
}

fn image_attachment<'a>(command: &'a CommandInteraction) -> Option<&'a Attachment> {
    command
        .data
        .options()
        .into_iter()
        .find(|option| option.name == IMAGE_OPTION)
        .and_then(|option| match option.value {
            ResolvedValue::Attachment(attachment) => Some(attachment),
            _ => None,
        })
}

/// Content types Discord reports for images start with `image/`.
pub fn is_image_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.starts_with("image/"))
}

#[async_trait]
impl SlashCommand for OcrTestCommand {
    fn name(&self) -> &'static str {
        NAME
    }

    fn definition(&self) -> CreateCommand {
        CreateCommand::new(NAME)
            .description("Extract text from a betting slip image using OCR")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Attachment,
                    IMAGE_OPTION,
                    "The image to perform OCR on",
                )
                .required(true),
            )
    }

    async fn execute(&self, ctx: &Context, command: &CommandInteraction) -> Result<()> {
        command
            .defer(&ctx.http)
            .await
            .context("Failed to defer reply")?;

        let attachment = image_attachment(command)
            .ok_or_else(|| anyhow!("missing required option '{}'", IMAGE_OPTION))?;

        if !is_image_content_type(attachment.content_type.as_deref()) {
            tracing::info!(
                "Rejected {} ({:?})",
                attachment.filename,
                attachment.content_type
            );
            return self.edit(ctx, command, reply::INVALID_IMAGE).await;
        }

        let stamp = chrono::Utc::now().timestamp_millis();
        let files = RequestFiles::new(&self.config.temp_dir, stamp);
        tracing::info!(
            "OCR request {} from {} for {}",
            stamp,
            command.user.name,
            attachment.filename
        );

        let result = self.run(ctx, command, attachment, &files).await;

        schedule_cleanup(
            files.all(),
            Duration::from_secs(self.config.cleanup_delay_secs),
        );

        if let Err(e) = result {
            tracing::error!("OCR error for request {}: {:#}", stamp, e);
            self.edit(ctx, command, reply::ocr_failed(&e)).await?;
        }

        Ok(())
    }
}
