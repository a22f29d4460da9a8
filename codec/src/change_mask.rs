//! Per-field change masks.

use bitstream::{BitReader, BitResult, BitWriter};

use crate::error::{CodecError, CodecResult};
use crate::field::{FieldKind, SnapshotValue};

const WORD_BITS: usize = 32;

/// One bit per field, in field order, stored in 32-bit words.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeMask {
    words: Vec<u32>,
    bits: usize,
}

impl ChangeMask {
    /// Creates an all-clear mask of `bits` bits.
    #[must_use]
    pub fn new(bits: usize) -> Self {
        Self {
            words: vec![0; bits.div_ceil(WORD_BITS)],
            bits,
        }
    }

    /// Folds each field's change predicate into a mask.
    ///
    /// A pure function of `current` and `baseline`.
    pub fn compute(
        fields: &[FieldKind],
        current: &[SnapshotValue],
        baseline: &[SnapshotValue],
    ) -> CodecResult<Self> {
        for values in [current, baseline] {
            if values.len() != fields.len() {
                return Err(CodecError::FieldCountMismatch {
                    expected: fields.len(),
                    actual: values.len(),
                });
            }
        }

        let mut mask = Self::new(fields.len());
        for (index, ((field, value), base)) in fields.iter().zip(current).zip(baseline).enumerate()
        {
            let changed = field.changed(value, base).map_err(|err| err.at(index))?;
            mask.set(index, changed);
        }
        Ok(mask)
    }

    /// Number of bits (fields) in the mask.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits
    }

    #[must_use]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Sets or clears bit `index`. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, value: bool) {
        if index >= self.bits {
            return;
        }
        let word = &mut self.words[index / WORD_BITS];
        let bit = 1u32 << (index % WORD_BITS);
        if value {
            *word |= bit;
        } else {
            *word &= !bit;
        }
    }

    /// Returns bit `index`; out-of-range indices read as clear.
    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        index < self.bits && self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0
    }

    /// Returns `true` if no field changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    #[must_use]
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|word| word.count_ones()).sum()
    }

    /// Writes the mask raw: 32 bits per full word, the remainder for the last.
    pub fn write(&self, writer: &mut BitWriter) -> BitResult<()> {
        for (index, word) in self.words.iter().enumerate() {
            writer.write_bits(u64::from(*word), self.word_width(index))?;
        }
        Ok(())
    }

    /// Reads a mask of `bits` bits written by [`ChangeMask::write`].
    pub fn read(reader: &mut BitReader<'_>, bits: usize) -> BitResult<Self> {
        let mut mask = Self::new(bits);
        for index in 0..mask.words.len() {
            let width = mask.word_width(index);
            mask.words[index] = reader.read_bits(width)? as u32;
        }
        Ok(mask)
    }

    fn word_width(&self, index: usize) -> u8 {
        let remaining = self.bits - index * WORD_BITS;
        remaining.min(WORD_BITS) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedString64;
    use schema::{FieldCodec, FieldDef};

    fn kinds(codecs: &[FieldCodec]) -> Vec<FieldKind> {
        codecs
            .iter()
            .enumerate()
            .map(|(i, codec)| FieldKind::from_def(&FieldDef::new(format!("f{i}"), *codec), 61))
            .collect()
    }

    #[test]
    fn set_get_and_count() {
        let mut mask = ChangeMask::new(40);
        assert!(mask.is_empty());
        mask.set(0, true);
        mask.set(33, true);
        mask.set(39, true);
        mask.set(39, false);
        mask.set(40, true);

        assert!(mask.get(0));
        assert!(mask.get(33));
        assert!(!mask.get(39));
        assert!(!mask.get(40));
        assert_eq!(mask.count_ones(), 2);
        assert_eq!(mask.words(), &[1, 2]);
    }

    #[test]
    fn first_field_is_not_special() {
        let fields = kinds(&[FieldCodec::Int, FieldCodec::Int]);
        let current = [SnapshotValue::Int(1), SnapshotValue::Int(5)];
        let baseline = [SnapshotValue::Int(1), SnapshotValue::Int(4)];
        let mask = ChangeMask::compute(&fields, &current, &baseline).unwrap();
        assert!(!mask.get(0));
        assert!(mask.get(1));
    }

    #[test]
    fn compute_is_idempotent() {
        let fields = kinds(&[FieldCodec::Bool, FieldCodec::FixedString64, FieldCodec::Float]);
        let current = [
            SnapshotValue::Bool(1),
            SnapshotValue::String(FixedString64::new("a")),
            SnapshotValue::Float(1.0),
        ];
        let baseline = [
            SnapshotValue::Bool(0),
            SnapshotValue::String(FixedString64::new("a")),
            SnapshotValue::Float(2.0),
        ];
        let first = ChangeMask::compute(&fields, &current, &baseline).unwrap();
        let second = ChangeMask::compute(&fields, &current, &baseline).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.words(), &[0b101]);
    }

    #[test]
    fn compute_rejects_wrong_lengths_and_types() {
        let fields = kinds(&[FieldCodec::Int]);
        let err = ChangeMask::compute(&fields, &[], &[SnapshotValue::Int(0)]).unwrap_err();
        assert!(matches!(err, CodecError::FieldCountMismatch { .. }));

        let err = ChangeMask::compute(&fields, &[SnapshotValue::Bool(0)], &[SnapshotValue::Int(0)])
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidValue { field: 0, .. }));
    }

    #[test]
    fn write_uses_exact_bit_count() {
        let mut mask = ChangeMask::new(35);
        mask.set(1, true);
        mask.set(34, true);

        let mut writer = BitWriter::new();
        mask.write(&mut writer).unwrap();
        assert_eq!(writer.bits_written(), 35);

        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        assert_eq!(ChangeMask::read(&mut reader, 35).unwrap(), mask);
    }

    #[test]
    fn empty_mask_writes_nothing() {
        let mask = ChangeMask::new(0);
        let mut writer = BitWriter::new();
        mask.write(&mut writer).unwrap();
        assert_eq!(writer.bits_written(), 0);
        assert!(mask.is_empty());
    }
}
