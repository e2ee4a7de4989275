//! Edit-point lookup on a single timeline track.
//!
//! An edit point is identified by the start frame of the item that follows
//! the cut. The locator only ever looks at start frames.

use std::fmt;
use std::str::FromStr;

/// Track kind as understood by the host's `GetItemsInTrack` query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    #[default]
    Video,
    Audio,
    Subtitle,
}

impl TrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
            TrackKind::Subtitle => "subtitle",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(TrackKind::Video),
            "audio" => Ok(TrackKind::Audio),
            "subtitle" => Ok(TrackKind::Subtitle),
            other => Err(format!("unknown track type '{}' (video|audio|subtitle)", other)),
        }
    }
}

/// Track address: kind + 1-based index. Defaults to the first video track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackRef {
    pub kind: TrackKind,
    pub index: u32,
}

impl TrackRef {
    pub const fn new(kind: TrackKind, index: u32) -> Self {
        Self { kind, index }
    }
}

impl Default for TrackRef {
    fn default() -> Self {
        Self::new(TrackKind::Video, 1)
    }
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.index)
    }
}

/// How the locator walks the host's item list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ScanOrder {
    /// First item past the cursor in the order the host returned them
    #[default]
    HostOrder,
    /// Nearest start frame past the cursor, regardless of host order
    Sorted,
}

/// Start frame of the next edit point strictly after `skip_frame`.
///
/// With [`ScanOrder::HostOrder`] the first match in iteration order wins, so
/// a host that returns items out of timeline order can yield a non-minimal
/// edit point. [`ScanOrder::Sorted`] always yields the minimum.
pub fn next_edit_point<I>(starts: I, skip_frame: i64, order: ScanOrder) -> Option<i64>
where
    I: IntoIterator<Item = i64>,
{
    let mut past = starts.into_iter().filter(|&start| start > skip_frame);
    match order {
        ScanOrder::HostOrder => past.next(),
        ScanOrder::Sorted => past.min(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTS: [i64; 4] = [0, 120, 300, 600];

    #[test]
    fn test_strictly_greater_first_match() {
        assert_eq!(next_edit_point(STARTS, 120, ScanOrder::HostOrder), Some(300));
        assert_eq!(next_edit_point(STARTS, 119, ScanOrder::HostOrder), Some(120));
        assert_eq!(next_edit_point(STARTS, -1, ScanOrder::HostOrder), Some(0));
    }

    #[test]
    fn test_none_after_last_edit() {
        assert_eq!(next_edit_point(STARTS, 600, ScanOrder::HostOrder), None);
        assert_eq!(next_edit_point(STARTS, 10_000, ScanOrder::Sorted), None);
        assert_eq!(next_edit_point(Vec::<i64>::new(), 0, ScanOrder::HostOrder), None);
    }

    #[test]
    fn test_host_order_is_order_dependent() {
        let shuffled = [0, 600, 120, 300];
        assert_eq!(next_edit_point(shuffled, 120, ScanOrder::HostOrder), Some(600));
        assert_eq!(next_edit_point(shuffled, 120, ScanOrder::Sorted), Some(300));
    }

    #[test]
    fn test_track_kind_parse() {
        assert_eq!("Video".parse::<TrackKind>(), Ok(TrackKind::Video));
        assert_eq!("audio".parse::<TrackKind>(), Ok(TrackKind::Audio));
        assert!("title".parse::<TrackKind>().is_err());
        assert_eq!(TrackRef::default().to_string(), "video 1");
    }
}
