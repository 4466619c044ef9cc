/// `MM:SS`, switching to `H:MM:SS` once past an hour.
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Strips a `data:image/...;base64,` prefix, if any.
pub fn strip_data_url_prefix(image: &str) -> &str {
    for mime in ["png", "jpeg", "jpg"] {
        if let Some(rest) = image.strip_prefix(&format!("data:image/{mime};base64,")) {
            return rest;
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use crate::utils::{format_duration, strip_data_url_prefix};

    #[test]
    fn duration() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(7), "00:07");
        assert_eq!(format_duration(1500), "25:00");
        assert_eq!(format_duration(3599), "59:59");
        assert_eq!(format_duration(3600), "1:00:00");
        assert_eq!(format_duration(3725), "1:02:05");
    }

    #[test]
    fn data_url() {
        assert_eq!(strip_data_url_prefix("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_url_prefix("data:image/jpg;base64,BBBB"), "BBBB");
        assert_eq!(strip_data_url_prefix("CCCC"), "CCCC");
        assert_eq!(
            strip_data_url_prefix("data:image/gif;base64,DDDD"),
            "data:image/gif;base64,DDDD"
        );
    }
}
