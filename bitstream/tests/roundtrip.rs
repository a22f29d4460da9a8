use bitstream::{BitReader, BitWriter, CompressionModel};

#[test]
fn writer_roundtrip_bits() {
    let mut writer = BitWriter::new();
    writer.write_bits(0b1010, 4).unwrap();
    writer.write_bits(0xAB, 8).unwrap();
    let bytes = writer.finish();

    let mut reader = BitReader::new(&bytes);
    assert_eq!(reader.read_bits(4).unwrap(), 0b1010);
    assert_eq!(reader.read_bits(8).unwrap(), 0xAB);
}

#[test]
fn appended_records_read_back_in_order() {
    let model = CompressionModel::default();

    let mut first = BitWriter::new();
    first.write_packed_i32_delta(12, 10, &model).unwrap();
    let mut second = BitWriter::new();
    second.write_bit(true);
    second.write_packed_u32(70_000, &model).unwrap();

    let mut packet = BitWriter::new();
    packet.write_bits(0b101, 3).unwrap();
    packet.append(&first);
    packet.append(&second);
    let bytes = packet.finish();

    let mut reader = BitReader::new(&bytes);
    assert_eq!(reader.read_bits(3).unwrap(), 0b101);
    assert_eq!(reader.read_packed_i32_delta(10, &model).unwrap(), 12);
    assert!(reader.read_bit().unwrap());
    assert_eq!(reader.read_packed_u32(&model).unwrap(), 70_000);
}
