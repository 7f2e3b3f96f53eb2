// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing message templates.

use chrono::{DateTime, Utc};
use regcode_core::types::{CodeResult, TriggerSource, UserRef};

pub const COOLDOWN: &str = "⏳ Esperá un momento antes de volver a pedir un código.";

pub const RATE_LIMITED: &str =
    "Estás solicitando códigos muy rápido. Esperá un momento e intentá de nuevo.";

pub const GENERATION_FAILED: &str =
    "❌ No se pudo generar el código en este momento. Probá nuevamente en unos segundos.";

/// Shown instead of an expiry when the backend declared none.
pub const NO_EXPIRY: &str = "Tiempo limitado";

/// `dd/mm/YYYY HH:MM:SS UTC`, or [`NO_EXPIRY`].
pub fn format_expiry(expires_at: Option<DateTime<Utc>>) -> String {
    match expires_at {
        Some(at) => at.format("%d/%m/%Y %H:%M:%S UTC").to_string(),
        None => NO_EXPIRY.to_string(),
    }
}

/// The private message carrying the code.
pub fn code_message(result: &CodeResult, register_command: &str) -> String {
    format!(
        "🔐 **Código de registro**\n\
         ────────────────────\n\
         **`{code}`**\n\n\
         Usalo en HaxBall con:\n\
         `{register_command} {code}`\n\n\
         ⏱ Válido hasta: {expiry}\n\n\
         _Si no te llega este mensaje, asegurate de tener los mensajes privados abiertos._",
        code = result.code,
        expiry = format_expiry(result.expires_at),
    )
}

pub fn cooldown_notice(user: &UserRef) -> String {
    format!("{} {COOLDOWN}", user.mention())
}

pub fn confirmation(user: &UserRef) -> String {
    format!("📩 {}, te envié el código por mensaje privado.", user.mention())
}

/// Posted publicly when the code was generated but the DM bounced.
pub fn dm_closed_notice(user: &UserRef, retry_hint: &str) -> String {
    format!(
        "{}, te envié el código pero tenés los mensajes privados cerrados. \
         Abrilos y volvé a escribir `{retry_hint}`.",
        user.mention()
    )
}

/// Posted publicly when even the failure message could not be sent privately.
pub fn failure_notice(user: &UserRef) -> String {
    format!(
        "{}, no pude enviarte el código por privado. Abrí tus DMs y volvé a pedirlo.",
        user.mention()
    )
}

/// What the user should type to try again.
pub fn retry_hint(source: &TriggerSource, text_command: &str) -> String {
    match source {
        TriggerSource::TextCommand { .. } => text_command.to_string(),
        TriggerSource::Interaction { command } => format!("/{command}"),
    }
}
