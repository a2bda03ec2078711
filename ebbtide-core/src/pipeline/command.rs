//! Production pipeline running an operator-configured external command.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{AcquisitionPipeline, PipelineError};
use crate::queue::JobPayload;

/// Placeholder replaced with the job's magnet link.
const MAGNET_PLACEHOLDER: &str = "{magnet}";
/// Placeholder replaced with the job's output file path.
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Pipeline that shells out to an external fetch+encode command.
///
/// The command template is whitespace-separated; `{magnet}` and `{output}`
/// placeholders are substituted per job. The command is expected to write
/// the finished file at the output path and exit zero.
pub struct CommandPipeline {
    template: Vec<String>,
    encoded_root: PathBuf,
}

impl CommandPipeline {
    /// Creates a pipeline from a command template.
    ///
    /// # Errors
    /// - `PipelineError::Spawn` - Template is empty
    pub fn new(command: &str, encoded_root: PathBuf) -> Result<Self, PipelineError> {
        let template: Vec<String> = command.split_whitespace().map(str::to_string).collect();
        if template.is_empty() {
            return Err(PipelineError::Spawn {
                reason: "empty pipeline command".to_string(),
            });
        }

        Ok(Self {
            template,
            encoded_root,
        })
    }

    fn render(&self, payload: &JobPayload, output: &str) -> Vec<String> {
        self.template
            .iter()
            .map(|part| {
                part.replace(MAGNET_PLACEHOLDER, &payload.magnet_link)
                    .replace(OUTPUT_PLACEHOLDER, output)
            })
            .collect()
    }
}

#[async_trait]
impl AcquisitionPipeline for CommandPipeline {
    async fn run(&self, payload: &JobPayload) -> Result<PathBuf, PipelineError> {
        let dest_dir = self.encoded_root.join(&payload.filename);
        tokio::fs::create_dir_all(&dest_dir).await?;
        let output = dest_dir.join(&payload.filename);

        let argv = self.render(payload, &output.to_string_lossy());
        let Some((program, args)) = argv.split_first() else {
            return Err(PipelineError::Spawn {
                reason: "empty pipeline command".to_string(),
            });
        };

        tracing::debug!(program = %program, output = %output.display(), "launching pipeline command");

        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| PipelineError::Spawn {
                reason: e.to_string(),
            })?;

        if !status.success() {
            return Err(PipelineError::Failed {
                reason: format!("pipeline command exited with {status}"),
            });
        }

        if !tokio::fs::try_exists(&output).await? {
            return Err(PipelineError::Failed {
                reason: format!("pipeline produced no file at {}", output.display()),
            });
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn payload() -> JobPayload {
        JobPayload {
            magnet_link: "magnet:?xt=urn:btih:0000&dn=clip.mp4&".to_string(),
            filename: "clip.mp4".to_string(),
            token: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_empty_template_rejected() {
        let result = CommandPipeline::new("   ", PathBuf::from("/tmp"));
        assert!(result.is_err());
    }

    #[test]
    fn test_placeholders_substituted() {
        let pipeline =
            CommandPipeline::new("fetcher --magnet {magnet} --out {output}", PathBuf::from("/x"))
                .unwrap();
        let argv = pipeline.render(&payload(), "/x/encodedVideos/clip.mp4/clip.mp4");

        assert_eq!(argv[0], "fetcher");
        assert_eq!(argv[2], "magnet:?xt=urn:btih:0000&dn=clip.mp4&");
        assert_eq!(argv[4], "/x/encodedVideos/clip.mp4/clip.mp4");
    }
}
