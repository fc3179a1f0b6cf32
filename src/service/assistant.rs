use serde::{Deserialize, Serialize};

/// Conversation stages for the bidding assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Searching,
    Analysis,
    Plans,
    Confirmed,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Searching => "searching",
            Stage::Analysis => "analysis",
            Stage::Plans => "plans",
            Stage::Confirmed => "confirmed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(Stage::Idle),
            "searching" => Some(Stage::Searching),
            "analysis" => Some(Stage::Analysis),
            "plans" => Some(Stage::Plans),
            "confirmed" => Some(Stage::Confirmed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandReply {
    pub reply: String,
    pub stage: Option<Stage>,
    pub selected_plan: Option<String>,
}

impl CommandReply {
    fn text(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            stage: None,
            selected_plan: None,
        }
    }
}

/// Pure command router over (message, current stage). Persisting the
/// resulting stage/plan is the caller's concern.
pub fn route_command(text: &str, _stage: Stage) -> CommandReply {
    let msg = text.trim();
    if msg.is_empty() {
        return CommandReply::text("Envía un comando: /buscar, /analizar, /planes o /confirmar");
    }

    if msg.starts_with("/buscar") {
        return CommandReply {
            reply: "🔎 Búsqueda iniciada. Te avisaré cuando encuentre licitaciones compatibles."
                .to_string(),
            stage: Some(Stage::Searching),
            selected_plan: None,
        };
    }

    if msg.starts_with("/analizar") {
        return CommandReply {
            reply: "📊 Ejecutando análisis de stock, costos, margen, riesgo y probabilidad de adjudicación."
                .to_string(),
            stage: Some(Stage::Analysis),
            selected_plan: None,
        };
    }

    if msg.starts_with("/planes") {
        return CommandReply {
            reply: "💡 Puedes elegir: competitivo, equilibrado o rentable. Usa /confirmar <plan>."
                .to_string(),
            stage: Some(Stage::Plans),
            selected_plan: None,
        };
    }

    if let Some(rest) = msg.strip_prefix("/confirmar") {
        let selected = rest.trim();
        let selected = if selected.is_empty() {
            "equilibrado"
        } else {
            selected
        };
        return CommandReply {
            reply: format!(
                "✅ Plan '{selected}' confirmado. Generaré PDF y enviaré la propuesta."
            ),
            stage: Some(Stage::Confirmed),
            selected_plan: Some(selected.to_string()),
        };
    }

    CommandReply::text("Comando no reconocido. Usa /buscar, /analizar, /planes, /confirmar")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_gets_help() {
        let reply = route_command("   ", Stage::Idle);
        assert!(reply.reply.contains("/buscar"));
        assert!(reply.stage.is_none());
    }

    #[test]
    fn commands_advance_stages() {
        assert_eq!(
            route_command("/buscar", Stage::Idle).stage,
            Some(Stage::Searching)
        );
        assert_eq!(
            route_command("/analizar", Stage::Searching).stage,
            Some(Stage::Analysis)
        );
        assert_eq!(
            route_command("/planes", Stage::Analysis).stage,
            Some(Stage::Plans)
        );
    }

    #[test]
    fn confirm_selects_named_plan() {
        let reply = route_command("/confirmar rentable", Stage::Plans);
        assert_eq!(reply.stage, Some(Stage::Confirmed));
        assert_eq!(reply.selected_plan.as_deref(), Some("rentable"));
        assert!(reply.reply.contains("rentable"));
    }

    #[test]
    fn confirm_defaults_to_equilibrado() {
        let reply = route_command("/confirmar", Stage::Plans);
        assert_eq!(reply.selected_plan.as_deref(), Some("equilibrado"));
    }

    #[test]
    fn unknown_command_is_rejected() {
        let reply = route_command("/otra", Stage::Idle);
        assert!(reply.reply.contains("no reconocido"));
        assert!(reply.stage.is_none());
    }

    #[test]
    fn stage_round_trips_through_text() {
        for stage in [
            Stage::Idle,
            Stage::Searching,
            Stage::Analysis,
            Stage::Plans,
            Stage::Confirmed,
        ] {
            assert_eq!(Stage::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(Stage::parse("unknown"), None);
    }
}
