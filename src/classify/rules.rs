//! Fixed rule tables consulted by the URL classifier

/// Any URL containing one of these prefixes is never worth scheduling early
pub const BLACKLIST: &[&str] = &[
    "https://www.creativebookmark.com/",
    "https://www.ffupdate.org",
    "https://www.ad-tracker.example",
    "https://www.popup-ads-site.net",
    "https://www.bannerads.org",
    "https://nu.outsystemsenterprise.com/FSD/",
    "https://www.instagram.com/northeastern/",
    "https://www.northeastern.edu/charlotte/",
    "https://geo.northeastern.edu/blog/country/hong-kong/",
    "https://www.tiktok.com/@northeasternu",
    "https://research.northeastern.edu/cognitive-and-brain-health/",
    "https://www.facebook.com",
    "https://www.twitter.com",
    "https://www.instagram.com",
    "https://www.fonts.googleapis.com",
    "https://www.google.com",
    "https://www.youtube.com",
    "https://www.googletagmanager.com",
    "https://www.fonts.gstatic.com",
    "https://www.linkedin.com",
    "https://www.gmpg.org",
    "https://www.maps.google.com",
    "https://www.ajax.googleapis.com",
    "https://www.play.google.com",
    "https://www.youtu.be",
    "https://www.en.wikipedia.org",
    "https://www.cdnjs.cloudflare.com",
    "https://www.github.com",
    "https://www.wordpress.org",
    "https://www.plus.google.com",
    "https://www.pinterest.com",
    "https://www.drive.google.com",
    "https://www.support.google.com",
    "https://www.docs.google.com",
    "https://www.goo.gl",
    "https://www.bit.ly",
    "https://www.developers.google.com",
    "https://www.vimeo.com",
    "https://www.policies.google.com",
    "https://www.amazon.com",
    "https://www.creativecommons.org",
    "https://www.itunes.apple.com",
    "https://www.tiktok.com",
    "https://www.apps.apple.com",
    "https://www.medium.com",
    "https://www.flickr.com",
    "https://www.secure.gravatar.com",
    "https://www.accounts.google.com",
    "https://www.cloudflare.com",
    "https://www.soundcloud.com",
    "https://www.open.spotify.com",
    "https://www.gstatic.com",
    "https://www.sites.google.com",
    "https://www.ec.europa.eu",
    "https://www.lh3.googleusercontent.com",
    "https://www.t.me",
    "https://www.cdn.jsdelivr.net",
    "https://www.ncbi.nlm.nih.gov",
    "https://www.microsoft.com",
    "https://www.google-analytics.com",
    "https://www.paypal.com",
    "https://www.vk.com",
    "https://www.podcasts.apple.com",
    "https://www.w3.org",
    "https://www.x.com",
    "https://www.player.vimeo.com",
    "https://www.tinyurl.com",
    "https://www.reddit.com",
    "https://www.who.int",
    "https://www.forms.gle",
    "https://www.linktr.ee",
    "https://www.nytimes.com",
    "https://www.support.apple.com",
    "https://www.slideshare.net",
    "https://www.code.jquery.com",
    "https://www.mail.google.com",
    "https://www.twitch.tv",
    "https://www.amazon.co.uk",
    "https://www.meetup.com",
    "https://www.patreon.com",
    "https://www.mozilla.org",
    "https://www.api.whatsapp.com",
    "https://www.apple.com",
    "https://www.dropbox.com",
    "https://www.maps.googleapis.com",
    "https://www.forbes.com",
    "https://www.amazon.de",
    "https://www.theguardian.com",
    "https://www.maps.app.goo.gl",
    "https://www.support.microsoft.com",
    "https://www.bing.com",
    "https://www.s3.amazonaws.com",
    "https://www.de.wikipedia.org",
    "https://www.news.google.com",
    "https://www.wa.me",
    "https://www.ftc.gov",
];

/// Marker for hidden-service hosts
pub const ONION_MARKER: &str = ".onion";

/// Image and video suffixes, matched case-sensitively against the end of the URL
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "mp4", "avi", "mkv", "mov", "wmv", "flv", "webm",
];

pub const SOCIAL_DOMAINS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "instagram.com",
    "tiktok.com",
];

pub const AD_MARKERS: &[&str] = &["ad", "ads", "tracker", "banner"];

pub const TRUSTED_SUFFIXES: &[&str] = &[".edu", ".gov"];

pub const TOPIC_MARKERS: &[&str] = &["research", "science"];

/// Returns true if `url` ends in `.<ext>` for one of the media extensions
pub fn has_media_extension(url: &str) -> bool {
    MEDIA_EXTENSIONS.iter().any(|ext| {
        url.strip_suffix(ext)
            .is_some_and(|stem| stem.ends_with('.'))
    })
}

pub fn contains_any(url: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| url.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_extension_requires_dot() {
        assert!(has_media_extension("https://example.com/cat.png"));
        assert!(has_media_extension("https://example.com/clip.webm"));
        assert!(!has_media_extension("https://example.com/png"));
        assert!(!has_media_extension("https://example.com/cat.PNG"));
        assert!(!has_media_extension("https://example.com/cat.png?size=2"));
    }

    #[test]
    fn test_contains_any() {
        assert!(contains_any("https://tracker.example.com", AD_MARKERS));
        assert!(!contains_any("https://example.com/", TOPIC_MARKERS));
    }
}
