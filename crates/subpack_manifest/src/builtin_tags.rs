use subpack_core::BuildContext;

/// Components provided by the host itself.
pub const BUILTIN_TAGS: &[&str] = &[
  // view containers
  "cover-image",
  "cover-view",
  "grid-view",
  "list-view",
  "match-media",
  "movable-area",
  "movable-view",
  "page-container",
  "root-portal",
  "scroll-view",
  "share-element",
  "sticky-header",
  "sticky-section",
  "swiper",
  "swiper-item",
  "view",
  // basic content
  "icon",
  "progress",
  "rich-text",
  "text",
  // forms
  "button",
  "checkbox",
  "checkbox-group",
  "editor",
  "form",
  "input",
  "keyboard-accessory",
  "label",
  "picker",
  "picker-view",
  "picker-view-column",
  "radio",
  "radio-group",
  "slider",
  "switch",
  "textarea",
  // navigation
  "functional-page-navigator",
  "navigator",
  // media
  "audio",
  "camera",
  "channel-live",
  "channel-video",
  "image",
  "live-player",
  "live-pusher",
  "video",
  "voip-room",
  "map",
  "canvas",
  // open capabilities
  "web-view",
  "ad",
  "ad-custom",
  "official-account",
  "open-data",
  "native-component",
  "aria-component",
  "navigation-bar",
  "page-meta",
];

pub fn is_builtin_tag(tag: &str) -> bool {
  BUILTIN_TAGS.contains(&tag)
}

/// Tags usable anywhere without a `usingComponents` entry.
pub fn is_global_tag(ctx: &BuildContext, tag: &str) -> bool {
  is_builtin_tag(tag) || ctx.declared_global_tags.contains(tag)
}
