//! Mirror content: the primary embed carrying the message body, one embed per
//! attachment, and the confirmation embeds posted back to the origin channel.

use std::borrow::Cow;

use pinmirror_types::Embed;
use pinmirror_types::models::{Attachment, SourceMessage};

pub const MAX_BODY_CHARS: usize = 800;
pub const TRUNCATE_MARKER: &str = "[...]";
pub const MESSAGE_LINK_TEXT: &str = "View the message";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Cut `content` to at most `max_chars` characters, marker included.
/// Counts characters, not bytes.
pub fn truncate_body<'a>(content: &'a str, max_chars: usize, marker: &str) -> Cow<'a, str> {
    if content.chars().count() <= max_chars {
        return Cow::Borrowed(content);
    }

    let keep = max_chars.saturating_sub(marker.chars().count());
    let mut out: String = content.chars().take(keep).collect();
    out.push_str(marker);
    Cow::Owned(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Link,
}

/// A declared content type wins; the filename extension is only consulted
/// when there is none.
pub fn classify_attachment(attachment: &Attachment) -> AttachmentKind {
    if let Some(content_type) = attachment.content_type.as_deref().filter(|ct| !ct.trim().is_empty()) {
        let primary = content_type.split('/').next().unwrap_or_default().trim();
        return if primary.eq_ignore_ascii_case("image") {
            AttachmentKind::Image
        } else {
            AttachmentKind::Link
        };
    }

    let extension = attachment
        .filename
        .as_deref()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => AttachmentKind::Image,
        _ => AttachmentKind::Link,
    }
}

/// Field value shared by fresh mirrors and edits.
pub fn body_field_value(content: &str, jump_url: &str) -> String {
    format!(
        "{}\n[{}]({})",
        truncate_body(content, MAX_BODY_CHARS, TRUNCATE_MARKER),
        MESSAGE_LINK_TEXT,
        jump_url
    )
}

pub fn build_mirror_embeds(message: &SourceMessage, display_name: &str, jump_url: &str) -> Vec<Embed> {
    let title = format!(
        ":pushpin: Pinned by **{}** in <#{}>",
        display_name, message.channel_id
    );
    let primary = Embed::titled(title)
        .with_field(message.author.name.clone(), body_field_value(&message.content, jump_url));

    let mut embeds = vec![primary];
    embeds.extend(attachment_embeds(&message.attachments));
    embeds
}

fn attachment_embeds(attachments: &[Attachment]) -> Vec<Embed> {
    let total = attachments.len();
    let mut embeds = Vec::with_capacity(total);

    for (idx, attachment) in attachments.iter().enumerate() {
        let position = format!("{}/{}", idx + 1, total);
        match classify_attachment(attachment) {
            AttachmentKind::Image => {
                embeds.push(
                    Embed::titled(format!("Attached image ({})", position)).with_image(attachment.url.clone()),
                );
            }
            AttachmentKind::Link if !attachment.url.is_empty() => {
                embeds.push(
                    Embed::titled(format!("Attached Media ({})", position)).with_url(attachment.url.clone()),
                );
            }
            AttachmentKind::Link => {}
        }
    }

    embeds
}

/// Replace the body of an existing mirror's primary embed, keeping its
/// attribution and every attachment embed as posted. `None` when the mirror
/// has no embeds to rebuild.
pub fn rebuild_primary(existing: &[Embed], message: &SourceMessage, jump_url: &str) -> Option<Vec<Embed>> {
    let (first, rest) = existing.split_first()?;

    let field_name = first
        .fields
        .first()
        .map(|f| f.name.clone())
        .unwrap_or_else(|| message.author.name.clone());

    let primary = Embed {
        title: first.title.clone(),
        description: first.description.clone(),
        ..Embed::default()
    }
    .with_field(field_name, body_field_value(&message.content, jump_url));

    let mut embeds = Vec::with_capacity(existing.len());
    embeds.push(primary);
    embeds.extend_from_slice(rest);
    Some(embeds)
}

pub fn pinned_confirmation(display_name: &str, original_url: &str, mirror_url: &str) -> Embed {
    Embed::titled(format!("{} pinned a message", display_name)).with_description(format!(
        "{} just pinned [a message]({}). Check out [the pin]({})",
        display_name, original_url, mirror_url
    ))
}

pub fn already_pinned_confirmation(display_name: &str, original_url: &str, mirror_url: &str) -> Embed {
    Embed::titled(format!("{} pinned a message", display_name)).with_description(format!(
        "This [message]({}) was already pinned! Check out [the pin]({})",
        original_url, mirror_url
    ))
}

pub fn prompt_notice(pin_emoji: &str) -> Embed {
    Embed::titled("Mirror this pin?").with_description(format!(
        "Auto mode is off. A moderator can reply to the pinned message with {} to copy it to the pin channel.",
        pin_emoji
    ))
}
