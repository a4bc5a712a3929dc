use crate::audio::TrackDescriptor;
use crate::error::{Result, VidtranscribeError};

/// Deduplicated audio track indices, kept in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackSelection {
    indices: Vec<usize>,
}

impl TrackSelection {
    /// Parse a comma-separated list such as `0,2,3`.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(VidtranscribeError::InvalidSelection(
                "Invalid --tracks value. Example: --tracks 0,2,3".to_string(),
            ));
        }

        let mut selection = Self::default();
        let tokens = raw.split(',').map(str::trim).filter(|t| !t.is_empty());
        for (position, token) in tokens.enumerate() {
            let index = token.parse::<usize>().map_err(|_| {
                VidtranscribeError::InvalidSelection(format!(
                    "Invalid track index at position {}: {}",
                    position + 1,
                    token
                ))
            })?;
            selection.insert(index);
        }

        if selection.is_empty() {
            return Err(VidtranscribeError::InvalidSelection(
                "Invalid --tracks value. Example: --tracks 0,2,3".to_string(),
            ));
        }
        Ok(selection)
    }

    /// Parse a single `--track` index.
    pub fn parse_single(raw: &str) -> Result<Self> {
        let token = raw.trim();
        let index = token.parse::<usize>().map_err(|_| {
            VidtranscribeError::InvalidSelection(format!("Invalid track index: {token}"))
        })?;
        Ok(Self::single(index))
    }

    pub fn single(index: usize) -> Self {
        Self {
            indices: vec![index],
        }
    }

    /// Every track in an inventory of `count` tracks.
    pub fn all(count: usize) -> Self {
        Self {
            indices: (0..count).collect(),
        }
    }

    /// Resolve the `--tracks` / `--track` pair; the list wins when both are given.
    pub fn from_options(tracks: Option<&str>, track: Option<&str>) -> Result<Self> {
        match (tracks, track) {
            (Some(list), _) => Self::parse(list),
            (None, Some(single)) => Self::parse_single(single),
            (None, None) => Err(VidtranscribeError::InvalidSelection(
                "Provide either --track <n> or --tracks <n1,n2,...>.".to_string(),
            )),
        }
    }

    fn insert(&mut self, index: usize) {
        if !self.indices.contains(&index) {
            self.indices.push(index);
        }
    }

    /// Fail on the first index that is not in `0..inventory.len()`.
    pub fn validate_against(&self, inventory: &[TrackDescriptor]) -> Result<()> {
        match self.indices.iter().find(|&&i| i >= inventory.len()) {
            Some(&index) => Err(VidtranscribeError::TrackOutOfRange(index)),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }
}
