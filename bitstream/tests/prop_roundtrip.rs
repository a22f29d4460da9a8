use bitstream::{BitReader, BitWriter, CompressionModel};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Bit(bool),
    Bits { bits: u8, value: u64 },
    Align,
    PackedU32(u32),
    PackedI32Delta { value: i32, baseline: i32 },
    PackedU32Delta { value: u32, baseline: u32 },
    F32Delta { value: u32, baseline: u32 },
}

fn mask_value(bits: u8, value: u64) -> u64 {
    if bits >= 64 {
        value
    } else {
        let mask = (1u64 << bits) - 1;
        value & mask
    }
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<bool>().prop_map(Op::Bit),
        (1u8..=64, any::<u64>()).prop_map(|(bits, value)| Op::Bits {
            bits,
            value: mask_value(bits, value),
        }),
        Just(Op::Align),
        any::<u32>().prop_map(Op::PackedU32),
        (any::<i32>(), any::<i32>())
            .prop_map(|(value, baseline)| Op::PackedI32Delta { value, baseline }),
        (any::<u32>(), any::<u32>())
            .prop_map(|(value, baseline)| Op::PackedU32Delta { value, baseline }),
        (any::<u32>(), any::<u32>()).prop_map(|(value, baseline)| Op::F32Delta { value, baseline }),
    ]
}

proptest! {
    #[test]
    fn prop_roundtrip_ops(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let model = CompressionModel::default();
        let mut writer = BitWriter::new();

        for op in &ops {
            match op {
                Op::Bit(b) => writer.write_bit(*b),
                Op::Bits { bits, value } => writer.write_bits(*value, *bits).unwrap(),
                Op::Align => writer.align_to_byte(),
                Op::PackedU32(v) => writer.write_packed_u32(*v, &model).unwrap(),
                Op::PackedI32Delta { value, baseline } => {
                    writer.write_packed_i32_delta(*value, *baseline, &model).unwrap();
                }
                Op::PackedU32Delta { value, baseline } => {
                    writer.write_packed_u32_delta(*value, *baseline, &model).unwrap();
                }
                Op::F32Delta { value, baseline } => {
                    writer
                        .write_packed_f32_delta(f32::from_bits(*value), f32::from_bits(*baseline))
                        .unwrap();
                }
            }
        }

        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);

        for op in &ops {
            match op {
                Op::Bit(b) => prop_assert_eq!(reader.read_bit().unwrap(), *b),
                Op::Bits { bits, value } => {
                    prop_assert_eq!(reader.read_bits(*bits).unwrap(), *value);
                }
                Op::Align => reader.align_to_byte().unwrap(),
                Op::PackedU32(v) => prop_assert_eq!(reader.read_packed_u32(&model).unwrap(), *v),
                Op::PackedI32Delta { value, baseline } => {
                    let read = reader.read_packed_i32_delta(*baseline, &model).unwrap();
                    prop_assert_eq!(read, *value);
                }
                Op::PackedU32Delta { value, baseline } => {
                    let read = reader.read_packed_u32_delta(*baseline, &model).unwrap();
                    prop_assert_eq!(read, *value);
                }
                Op::F32Delta { value, baseline } => {
                    let read = reader.read_packed_f32_delta(f32::from_bits(*baseline)).unwrap();
                    prop_assert_eq!(read.to_bits(), *value);
                }
            }
        }
    }

    #[test]
    fn prop_packed_size_matches_model(value in any::<u32>()) {
        let model = CompressionModel::default();
        let mut writer = BitWriter::new();
        writer.write_packed_u32(value, &model).unwrap();
        prop_assert_eq!(writer.bits_written(), model.packed_bits(value));
    }
}
