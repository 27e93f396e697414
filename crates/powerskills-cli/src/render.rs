//! Text rendering of the journey view.

use powerskills_minigame::application::query_handlers::MiniGameView;
use powerskills_minigame::domain::aggregates::MiniGamePhase;
use powerskills_narration::{NarratorState, Tone};
use powerskills_scenes::application::query_handlers::{
    CreditsView, JourneyView, MediaView, ModalView,
};
use powerskills_scenes::domain::aggregates::MediaState;

const BLOCKED_NARRATION: &str = "   🔇 narración bloqueada: escribe `play`";

fn tone_icon(tone: Tone) -> &'static str {
    match tone {
        Tone::Info => "ℹ",
        Tone::Success => "✔",
        Tone::Warning => "⚠",
    }
}

fn phase_name(phase: MiniGamePhase) -> &'static str {
    match phase {
        MiniGamePhase::Help => "instrucciones",
        MiniGamePhase::Playing => "jugando",
        MiniGamePhase::Error => "error",
        MiniGamePhase::Success => "completado",
    }
}

fn media_lines(media: &MediaView, lines: &mut Vec<String>) {
    let state = match media.state {
        MediaState::Pending => "pendiente",
        MediaState::Playing => "reproduciendo",
        MediaState::Blocked => "bloqueado",
    };
    lines.push(format!("🎬 {} ({state})", media.src));
    if media.state == MediaState::Blocked {
        lines.push("   ▶ reproducción bloqueada: escribe `play`".to_owned());
    }
    lines.push(format!("   [{}] → `skip`", media.skip_label));
}

fn modal_lines(modal: &ModalView, lines: &mut Vec<String>) {
    lines.push(format!("┌ {} {}", tone_icon(modal.tone), modal.title));
    for line in modal.body.lines() {
        lines.push(format!("│ {line}"));
    }
    lines.push(format!("└ [{}] → `ok`", modal.primary_label));
    if modal.narration == NarratorState::AwaitingGesture {
        lines.push(BLOCKED_NARRATION.to_owned());
    }
}

fn game_lines(game: &MiniGameView, lines: &mut Vec<String>) {
    lines.push(format!(
        "🎮 {} · {} · {}",
        game.title,
        game.strategy,
        phase_name(game.phase)
    ));
    if let Some(prompt) = &game.prompt {
        lines.push(format!("   ❓ {prompt}"));
    }
    for option in &game.options {
        let mark = if option.chosen { "✓" } else { " " };
        lines.push(format!("   [{mark}] {} ({})", option.label, option.id));
    }
    for item in &game.items {
        let mark = if item.placed { "✓" } else { " " };
        lines.push(format!(
            "   [{mark}] {} ({}) @ x={:.2} z={:.2}",
            item.label, item.id, item.position.x, item.position.z
        ));
    }
    if game.strategy == "tolerance_band" {
        let value = game.value.map_or_else(|| "—".to_owned(), |v| format!("{v:.2}"));
        lines.push(format!("   ⟷ valor: {value}"));
    }
    if let Some(score) = game.score {
        lines.push(format!("   puntos: {score}"));
    }
}

fn credits_lines(credits: &CreditsView, lines: &mut Vec<String>) {
    lines.push(format!("🎞 {}", credits.title));
    for line in credits.body.lines() {
        lines.push(format!("   {line}"));
    }
    lines.push(format!("   [{}] → `restart`", credits.restart_label));
    lines.push(format!("   [{}] → `more`", credits.more_label));
    if credits.narration == NarratorState::AwaitingGesture {
        lines.push(BLOCKED_NARRATION.to_owned());
    }
}

/// Renders everything on screen.
#[must_use]
pub fn render(view: &JourneyView) -> String {
    let mut lines = vec![format!(
        "── {} · escena {}/{}: {} ──",
        view.title, view.scene_number, view.scene_count, view.scene
    )];
    if let Some(media) = &view.media {
        media_lines(media, &mut lines);
    }
    if let Some(game) = &view.game {
        game_lines(game, &mut lines);
    }
    if let Some(credits) = &view.credits {
        credits_lines(credits, &mut lines);
    }
    if let Some(modal) = &view.modal {
        modal_lines(modal, &mut lines);
    }
    lines.join("\n")
}
