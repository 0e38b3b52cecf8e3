//! JSON commands and their dispatch onto the use cases.
//!
//! Every command that acts on a protagonist takes an optional `id`; without
//! one it targets the current protagonist.

use serde::Deserialize;
use serde_json::{json, Value};

use solterra_domain::{ProtagonistId, Stage};

use crate::app::App;
use crate::use_cases::ChapterError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Create {
        name: String,
    },
    Switch {
        id: ProtagonistId,
    },
    List,
    Start {
        id: Option<ProtagonistId>,
    },
    Advance {
        id: Option<ProtagonistId>,
        stage: Stage,
        choice_type: String,
        choice_value: String,
    },
    Transition {
        id: Option<ProtagonistId>,
        stage: Stage,
    },
    Stages {
        id: Option<ProtagonistId>,
    },
    Finalize {
        id: Option<ProtagonistId>,
    },
    Status {
        id: Option<ProtagonistId>,
    },
    Summary {
        id: Option<ProtagonistId>,
    },
    Converse {
        id: Option<ProtagonistId>,
        colleague: String,
        interaction: String,
    },
    Reset,
    Save,
    Load,
    Tick,
    Usage,
    ClearCache,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No protagonist selected")]
    NoCurrentProtagonist,
    #[error(transparent)]
    Chapter(#[from] ChapterError),
    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

async fn target(app: &App, id: Option<ProtagonistId>) -> Result<ProtagonistId, CommandError> {
    match id {
        Some(id) => Ok(id),
        None => app
            .store
            .current_protagonist()
            .await
            .ok_or(CommandError::NoCurrentProtagonist),
    }
}

/// Run one command and return its JSON result.
pub async fn dispatch(app: &App, command: Command) -> Result<Value, CommandError> {
    let chapter = &app.use_cases.chapter.progression;
    let protagonists = &app.use_cases.protagonist.management;

    let value = match command {
        Command::Create { name } => serde_json::to_value(protagonists.create(&name).await?)?,
        Command::Switch { id } => serde_json::to_value(protagonists.switch(id).await?)?,
        Command::List => serde_json::to_value(protagonists.list())?,
        Command::Start { id } => {
            let id = target(app, id).await?;
            serde_json::to_value(chapter.start_chapter(id).await?)?
        }
        Command::Advance {
            id,
            stage,
            choice_type,
            choice_value,
        } => {
            let id = target(app, id).await?;
            let outcome = chapter
                .advance(id, stage, &choice_type, &choice_value)
                .await?;
            serde_json::to_value(outcome)?
        }
        Command::Transition { id, stage } => {
            let id = target(app, id).await?;
            serde_json::to_value(chapter.transition_to_stage(id, stage).await?)?
        }
        Command::Stages { id } => {
            let id = target(app, id).await?;
            serde_json::to_value(chapter.available_stages(id).await?)?
        }
        Command::Finalize { id } => {
            let id = target(app, id).await?;
            serde_json::to_value(chapter.finalize_chapter(id).await?)?
        }
        Command::Status { id } => {
            let id = target(app, id).await?;
            serde_json::to_value(chapter.status(id).await?)?
        }
        Command::Summary { id } => {
            let id = target(app, id).await?;
            json!({
                "protagonist": protagonists.summary(id)?,
                "last_chapter": chapter.chapter_summary(id).await?,
            })
        }
        Command::Converse {
            id,
            colleague,
            interaction,
        } => {
            let id = target(app, id).await?;
            let dialogue = app
                .use_cases
                .conversation
                .converse
                .execute(id, &colleague, &interaction)
                .await?;
            serde_json::to_value(dialogue)?
        }
        Command::Reset => serde_json::to_value(chapter.reset_chapter_state().await?)?,
        Command::Save => json!({ "saved": app.use_cases.save.execute().await }),
        Command::Load => serde_json::to_value(app.use_cases.load.execute().await)?,
        Command::Tick => serde_json::to_value(app.use_cases.scheduler.execute().await)?,
        Command::Usage => serde_json::to_value(app.generator.usage().await)?,
        Command::ClearCache => {
            app.generator.clear_cache().await;
            json!({ "cleared": true })
        }
    };
    Ok(value)
}
