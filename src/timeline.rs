use crate::errors::TimelineError;
use crate::segmenter::CaptionUnit;

// @module: Caption timeline construction and SRT export

// @struct: Schedule slot for one caption unit
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    // @field: Index of the unit this entry schedules
    pub index: usize,

    // @field: Offset from the start of the video, in seconds
    pub start_secs: f64,

    // @field: Narration length for this unit, in seconds
    pub duration_secs: f64,
}

impl TimelineEntry {
    /// End of this entry's time window, in seconds
    pub fn end_secs(&self) -> f64 {
        self.start_secs + self.duration_secs
    }

    /// Convert start time to a formatted SRT timestamp
    pub fn format_start(&self) -> String {
        Self::format_timestamp(self.start_secs)
    }

    /// Convert end time to a formatted SRT timestamp
    pub fn format_end(&self) -> String {
        Self::format_timestamp(self.end_secs())
    }

    /// Format a time in seconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(secs: f64) -> String {
        let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let seconds = (total_ms % 60_000) / 1_000;
        let millis = total_ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

// @struct: One caption as displayed during a given entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleUnit<'a> {
    // @field: Caption text, borrowed from the owning timeline
    pub text: &'a str,

    // @field: True only for the unit being narrated
    pub highlighted: bool,
}

// @struct: Complete caption schedule for one document
#[derive(Debug, Clone)]
pub struct CaptionTimeline {
    units: Vec<CaptionUnit>,
    entries: Vec<TimelineEntry>,
}

impl CaptionTimeline {
    // @creates: Timeline from units and per-unit narration durations
    // @validates: One duration per unit
    pub fn build(units: Vec<CaptionUnit>, durations: &[f64]) -> Result<Self, TimelineError> {
        if units.len() != durations.len() {
            return Err(TimelineError::LengthMismatch {
                units: units.len(),
                durations: durations.len(),
            });
        }

        let mut entries = Vec::with_capacity(units.len());
        let mut clock = 0.0_f64;
        for (index, &duration_secs) in durations.iter().enumerate() {
            entries.push(TimelineEntry {
                index,
                start_secs: clock,
                duration_secs,
            });
            clock += duration_secs;
        }

        Ok(CaptionTimeline { units, entries })
    }

    /// Ordered caption units, exactly as segmented
    pub fn units(&self) -> &[CaptionUnit] {
        &self.units
    }

    /// Schedule entries, one per unit, in start order
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Units visible while `entry` is narrated: every unit up to and
    /// including its own, with only its own highlighted. An entry whose
    /// index lies outside this timeline yields no units.
    pub fn visible_units(&self, entry: &TimelineEntry) -> Vec<VisibleUnit<'_>> {
        if entry.index >= self.units.len() {
            return Vec::new();
        }

        self.units[..=entry.index]
            .iter()
            .enumerate()
            .map(|(position, unit)| VisibleUnit {
                text: unit.text.as_str(),
                highlighted: position == entry.index,
            })
            .collect()
    }

    /// Sum of all narration durations, in seconds
    pub fn total_duration(&self) -> f64 {
        self.entries.iter().map(|entry| entry.duration_secs).sum()
    }

    // @generates: SRT document with one cue per unit
    pub fn to_srt(&self) -> String {
        let mut content = String::new();

        for entry in &self.entries {
            content.push_str(&format!("{}\n", entry.index + 1));
            content.push_str(&format!(
                "{} --> {}\n",
                entry.format_start(),
                entry.format_end()
            ));
            content.push_str(&format!("{}\n\n", self.units[entry.index].text));
        }

        content
    }
}
