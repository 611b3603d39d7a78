//! The entity rewrite pass.
//!
//! A single forward walk over the raw text: literal runs are HTML-escaped,
//! each extracted entity is substituted with its rendered anchor form.

use feditext_entities::{Entity, EntityKind, extract};
use feditext_sanitize::escape_html;

use crate::account::RenderContext;
use crate::cache::MentionCache;
use crate::link::shortened_link;
use crate::mention::{self, MentionTarget};
use crate::options::RenderOptions;

/// Escape the text and replace every entity with rendered HTML.
pub(crate) fn rewrite(
    text: &str,
    options: &RenderOptions,
    context: &dyn RenderContext,
    cache: &MentionCache,
) -> String {
    let mut entities = extract(text);
    // The extractor returns sorted entities; re-sorting keeps the walk
    // correct even if that ever changes.
    entities.sort_by_key(|entity| entity.start);

    let mut out = String::with_capacity(text.len());
    let mut last_index = 0;

    for entity in &entities {
        out.push_str(&escape_html(&text[last_index..entity.start]));
        out.push_str(&render_entity(entity, options, context, cache));
        last_index = entity.end;
    }
    out.push_str(&escape_html(&text[last_index..]));

    out
}

fn render_entity(
    entity: &Entity,
    options: &RenderOptions,
    context: &dyn RenderContext,
    cache: &MentionCache,
) -> String {
    match entity.kind {
        EntityKind::Url => shortened_link(&entity.payload, options.with_rel_me),
        EntityKind::Hashtag => render_hashtag(&entity.payload, context),
        EntityKind::Mention => render_mention(&entity.payload, options, context, cache),
    }
}

fn render_hashtag(hashtag: &str, context: &dyn RenderContext) -> String {
    format!(
        r##"<a href="{url}" class="mention hashtag" rel="tag">#<span>{tag}</span></a>"##,
        url = escape_html(&context.tag_url(hashtag)),
        tag = escape_html(hashtag),
    )
}

fn render_mention(
    handle: &str,
    options: &RenderOptions,
    context: &dyn RenderContext,
    cache: &MentionCache,
) -> String {
    let (username, domain) = match handle.split_once('@') {
        Some((username, domain)) => (username, Some(domain)),
        None => (handle, None),
    };

    let resolution = mention::resolve(username, domain, options, context, cache);

    let account = match resolution.target {
        MentionTarget::KnownPlatform(platform, username) => {
            return format!(
                r#"<span class="h-card"><a href="{url}" target="blank" rel="noopener noreferrer" class="u-url mention">@<span>{username}@{domain}</span></a></span>"#,
                url = escape_html(&platform.profile_url(&username)),
                username = escape_html(&username),
                domain = platform.domain(),
            );
        }
        MentionTarget::Unresolved => return format!("@{}", escape_html(handle)),
        MentionTarget::Local(account) | MentionTarget::Remote(account) => account,
    };

    let display = if resolution.ambiguous || options.with_domains {
        account.pretty_handle()
    } else {
        account.username.clone()
    };

    format!(
        r#"<span class="h-card" translate="no"><a href="{url}" class="u-url mention">@<span>{display}</span></a></span>"#,
        url = escape_html(&account.url),
        display = escape_html(&display),
    )
}
