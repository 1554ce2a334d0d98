//! Per-class sampling and output archive assembly.
//!
//! Records are offered one at a time, in source order. The [`Assembler`]
//! decides whether a record fits in its class budget, encodes accepted
//! records to PNG and collects them in an [`OutputArchive`]. The archive is
//! only written to disk once the caller has offered every record.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::png::{encode_png, PixelSource};
use crate::util::{Error, Result};

/// Class label as stored in the source data.
pub type Label = u8;

/// Path of an image inside the output archive.
///
/// `index` is the record's position within its source split, so paths are
/// stable no matter how many records the budget rejected.
pub fn entry_path(class_name: &str, split: &str, index: usize) -> String {
    format!("{class_name}/{split}_{class_name}_{index:06}.png")
}

/// Per-class acceptance counters with an optional cap.
#[derive(Debug, Clone, Default)]
pub struct ClassBudget {
    per_class: BTreeMap<Label, usize>,
    cap: usize,
}

impl ClassBudget {
    /// `cap == 0` means unlimited.
    pub fn new(cap: usize) -> Self {
        Self {
            per_class: BTreeMap::new(),
            cap,
        }
    }

    #[inline]
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Records accepted so far for `label`.
    #[inline]
    pub fn count(&self, label: Label) -> usize {
        self.per_class.get(&label).copied().unwrap_or(0)
    }

    /// Whether another record of `label` would be accepted.
    #[inline]
    pub fn admits(&self, label: Label) -> bool {
        self.cap == 0 || self.count(label) < self.cap
    }

    /// Count one accepted record.
    pub fn record(&mut self, label: Label) {
        *self.per_class.entry(label).or_insert(0) += 1;
    }

    /// Accepted counts by label.
    pub fn per_class(&self) -> &BTreeMap<Label, usize> {
        &self.per_class
    }

    pub fn total(&self) -> usize {
        self.per_class.values().sum()
    }
}

/// Encoded images keyed by archive path, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct OutputArchive {
    entries: Vec<(String, Vec<u8>)>,
}

impl OutputArchive {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, path: String, data: Vec<u8>) {
        self.entries.push((path, data));
    }

    /// Data stored under `path`.
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, d)| d.as_slice())
    }

    /// All `(path, data)` entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries.iter().map(|(p, d)| (p.as_str(), d.as_slice()))
    }

    /// Write the archive as a ZIP file.
    ///
    /// Parent directories are created as needed. The ZIP is assembled in a
    /// temporary file next to `path` and renamed into place, so `path` never
    /// holds a partial archive.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display(), entries = self.len()))]
    pub fn write_zip(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let tmp = NamedTempFile::new_in(dir)?;
        let mut zip = ZipWriter::new(tmp);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, data) in &self.entries {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }

        let tmp = zip.finish()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::info!("wrote archive");
        Ok(())
    }
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Number of classes that contributed at least one image.
    pub classes: usize,
    pub added_total: usize,
    pub max_per_class: usize,
    /// Accepted images per class name.
    pub per_class: BTreeMap<String, usize>,
    /// Dataset-specific description of the run.
    pub detail: String,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "classes={} addedTotal={} maxPerClass={} ({})",
            self.classes, self.added_total, self.max_per_class, self.detail
        )
    }
}

/// Drives sampling and encoding for one run.
#[derive(Debug, Default)]
pub struct Assembler {
    budget: ClassBudget,
    archive: OutputArchive,
    class_names: BTreeMap<Label, String>,
    total: usize,
}

impl Assembler {
    /// `max_per_class == 0` means unlimited.
    pub fn new(max_per_class: usize) -> Self {
        Self {
            budget: ClassBudget::new(max_per_class),
            ..Self::default()
        }
    }

    pub fn budget(&self) -> &ClassBudget {
        &self.budget
    }

    /// Running count of accepted records.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether a record of `label` would currently be accepted.
    pub fn admits(&self, label: Label) -> bool {
        self.budget.admits(label)
    }

    /// Offer one record.
    ///
    /// Returns `Ok(false)` when the class is already at its cap (the record is
    /// skipped without encoding), `Ok(true)` once the record has been encoded
    /// and stored.
    pub fn offer<S: PixelSource + ?Sized>(
        &mut self,
        label: Label,
        class_name: &str,
        split: &str,
        index: usize,
        source: &S,
    ) -> Result<bool> {
        if !self.budget.admits(label) {
            tracing::trace!(label, index, "class full, skipping");
            return Ok(false);
        }

        let png = encode_png(source)?;
        let path = entry_path(class_name, split, index);
        tracing::trace!(%path, bytes = png.len(), "encoded");
        self.archive.insert(path, png);

        self.budget.record(label);
        self.class_names
            .entry(label)
            .or_insert_with(|| class_name.to_string());
        self.total += 1;
        Ok(true)
    }

    /// Finish the run, returning the archive and its summary.
    pub fn finish(self, detail: impl Into<String>) -> (OutputArchive, Summary) {
        let per_class: BTreeMap<String, usize> = self
            .budget
            .per_class()
            .iter()
            .map(|(label, &count)| {
                let name = self
                    .class_names
                    .get(label)
                    .cloned()
                    .unwrap_or_else(|| label.to_string());
                (name, count)
            })
            .collect();

        let summary = Summary {
            classes: per_class.len(),
            added_total: self.total,
            max_per_class: self.budget.cap(),
            per_class,
            detail: detail.into(),
        };
        (self.archive, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::png::FnSource;
    use std::io::Read;

    fn solid(v: u8) -> FnSource<impl Fn(u32, u32) -> [u8; 3]> {
        FnSource::new(2, 2, move |_, _| [v, v, v])
    }

    #[test]
    fn test_entry_path() {
        assert_eq!(entry_path("cat", "train", 42), "cat/train_cat_000042.png");
        assert_eq!(entry_path("7", "test", 1_234_567), "7/test_7_1234567.png");
    }

    #[test]
    fn test_budget_cap() {
        let mut budget = ClassBudget::new(2);
        assert!(budget.admits(3));
        budget.record(3);
        budget.record(3);
        assert!(!budget.admits(3));
        assert!(budget.admits(4));
        assert_eq!(budget.count(3), 2);
        assert_eq!(budget.total(), 2);
    }

    #[test]
    fn test_budget_unlimited() {
        let mut budget = ClassBudget::new(0);
        for _ in 0..1000 {
            budget.record(1);
        }
        assert!(budget.admits(1));
    }

    #[test]
    fn test_offer_skips_full_class_but_keeps_index() {
        let mut asm = Assembler::new(1);
        assert!(asm.offer(5, "5", "train", 0, &solid(1)).unwrap());
        assert!(!asm.offer(5, "5", "train", 1, &solid(2)).unwrap());
        assert!(asm.offer(6, "6", "train", 2, &solid(3)).unwrap());
        assert_eq!(asm.total(), 2);

        let (archive, summary) = asm.finish("unit");
        assert_eq!(archive.len(), 2);
        assert!(archive.get("5/train_5_000000.png").is_some());
        assert!(archive.get("6/train_6_000002.png").is_some());
        assert!(archive.get("5/train_5_000001.png").is_none());

        assert_eq!(summary.classes, 2);
        assert_eq!(summary.added_total, 2);
        assert_eq!(summary.per_class["5"], 1);
        assert_eq!(summary.to_string(), "classes=2 addedTotal=2 maxPerClass=1 (unit)");
    }

    #[test]
    fn test_offer_rejects_empty_image() {
        let mut asm = Assembler::new(0);
        let empty = FnSource::new(0, 0, |_, _| [0, 0, 0]);
        assert!(asm.offer(0, "0", "train", 0, &empty).is_err());
        // Failed encode must not be counted
        assert_eq!(asm.total(), 0);
        assert_eq!(asm.budget().count(0), 0);
    }

    #[test]
    fn test_write_zip_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("deeper").join("out.zip");

        let mut archive = OutputArchive::new();
        archive.insert("a/train_a_000000.png".into(), vec![1, 2, 3]);
        archive.insert("b/test_b_000009.png".into(), vec![4; 100]);
        archive.write_zip(&out).unwrap();

        let mut zip = zip::ZipArchive::new(fs::File::open(&out).unwrap()).unwrap();
        assert_eq!(zip.len(), 2);
        assert_eq!(zip.by_index(0).unwrap().name(), "a/train_a_000000.png");

        let mut data = Vec::new();
        zip.by_name("b/test_b_000009.png")
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();
        assert_eq!(data, vec![4; 100]);

        // Only the archive itself is left behind
        let leftovers = fs::read_dir(out.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
