use crate::MashupError;

/// A validated mashup request. Construction is the validation boundary: a
/// `MashupRequest` that exists has already passed every input check, so the
/// pipeline never re-examines the fields.
#[derive(Debug, Clone)]
pub struct MashupRequest {
    artist: String,
    video_count: u32,
    clip_duration_secs: u32,
    recipient_email: String,
}

/// Minimum video count accepted at the input boundary (exclusive).
pub const MIN_VIDEO_COUNT: u32 = 10;

/// Minimum per-clip duration in seconds accepted at the input boundary
/// (exclusive).
pub const MIN_CLIP_DURATION_SECS: u32 = 20;

impl MashupRequest {
    /// Validate raw field values and construct a request, or report the
    /// first violated constraint. Pure function: no network or filesystem
    /// access happens here.
    pub fn new(
        artist: &str,
        video_count: u32,
        clip_duration_secs: u32,
        recipient_email: &str,
    ) -> Result<Self, MashupError> {
        let artist = artist.trim();
        let recipient_email = recipient_email.trim();

        if artist.is_empty() {
            return Err(MashupError::Validation(
                "artist name must not be empty".to_string(),
            ));
        }
        if recipient_email.is_empty() {
            return Err(MashupError::Validation(
                "recipient email must not be empty".to_string(),
            ));
        }
        if !is_valid_email(recipient_email) {
            return Err(MashupError::Validation(format!(
                "invalid email address: {}",
                recipient_email
            )));
        }
        if video_count <= MIN_VIDEO_COUNT {
            return Err(MashupError::Validation(format!(
                "video count must be greater than {}",
                MIN_VIDEO_COUNT
            )));
        }
        if clip_duration_secs <= MIN_CLIP_DURATION_SECS {
            return Err(MashupError::Validation(format!(
                "clip duration must be greater than {} seconds",
                MIN_CLIP_DURATION_SECS
            )));
        }

        Ok(Self {
            artist: artist.to_string(),
            video_count,
            clip_duration_secs,
            recipient_email: recipient_email.to_string(),
        })
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn video_count(&self) -> u32 {
        self.video_count
    }

    pub fn clip_duration_secs(&self) -> u32 {
        self.clip_duration_secs
    }

    pub fn recipient_email(&self) -> &str {
        &self.recipient_email
    }
}

/// Basic address check: `local@domain.tld` where both parts are built from
/// word, dot, and hyphen characters, there is exactly one `@`, and the
/// domain contains at least one interior dot.
pub fn is_valid_email(address: &str) -> bool {
    let mut parts = address.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };

    let valid_chars = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == '-')
    };

    if !valid_chars(local) || !valid_chars(domain) {
        return false;
    }

    // Domain needs a dot-separated TLD, not a leading or trailing dot.
    match domain.rsplit_once('.') {
        Some((name, tld)) => !name.is_empty() && !tld.is_empty(),
        None => false,
    }
}
