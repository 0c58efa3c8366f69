use qoiv::{
    frame::Frame,
    header::{ColourSpace, FrameType, QovFrameHeader, QovHeader},
    pixels::PixelHashMap,
    utils::hash,
    Error,
};

#[test]
fn header_roundtrip() {
    let header = QovHeader {
        width: 640,
        height: 480,
        colourspace: ColourSpace::Srgb,
    };

    let mut bytes = Vec::new();
    header.write(&mut bytes).unwrap();
    assert_eq!(bytes.len(), 16);
    assert_eq!(&bytes[0..4], b"qoiv");
    assert_eq!(&bytes[13..16], &[0, 0, 0]);

    assert_eq!(QovHeader::read(&mut &bytes[..]).unwrap(), header);
}

#[test]
fn header_rejects_bad_magic() {
    let mut bytes = Vec::new();
    QovHeader {
        width: 1,
        height: 1,
        colourspace: ColourSpace::Linear,
    }
    .write(&mut bytes)
    .unwrap();
    bytes[0] = b'x';

    assert!(matches!(
        QovHeader::read(&mut &bytes[..]),
        Err(Error::InvalidHeader { .. })
    ));
}

#[test]
fn header_rejects_bad_colourspace() {
    let mut bytes = Vec::new();
    QovHeader {
        width: 1,
        height: 1,
        colourspace: ColourSpace::Srgb,
    }
    .write(&mut bytes)
    .unwrap();
    bytes[12] = 7;

    assert!(matches!(
        QovHeader::read(&mut &bytes[..]),
        Err(Error::InvalidHeader { .. })
    ));
}

#[test]
fn header_rejects_short_input() {
    let bytes = b"qoiv\x01\x00";
    assert!(matches!(
        QovHeader::read(&mut &bytes[..]),
        Err(Error::InvalidHeader { .. })
    ));
}

#[test]
fn frame_header_roundtrip() {
    for frame_type in [FrameType::Key, FrameType::Predicted] {
        let header = QovFrameHeader { frame_type };
        let mut bytes = Vec::new();
        header.write(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 1);
        assert_eq!(QovFrameHeader::read(&mut &bytes[..]).unwrap(), header);
    }
}

#[test]
fn frame_header_rejects_unknown_type() {
    let bytes = [10u8];
    assert!(matches!(
        QovFrameHeader::read(&mut &bytes[..]),
        Err(Error::InvalidFrameType { value: 10 })
    ));
}

#[test]
fn pixel_hash_map_collisions_overwrite() {
    let mut m = PixelHashMap::new();

    let red = [255, 0, 0];
    let green = [0, 255, 0];
    let blue = [0, 0, 255];
    // 3*17 + 5*2 = 61, same slot as red (3*255 = 765 = 61 mod 64)
    let clash_red = [17, 2, 0];
    assert_eq!(hash(red), 61);
    assert_eq!(hash(clash_red), 61);

    assert!(!m.contains(red));
    assert!(!m.contains(green));
    assert!(!m.contains(blue));
    assert!(!m.contains(clash_red));

    m.push(red);
    m.push(green);
    m.push(blue);
    assert!(m.contains(red));
    assert!(m.contains(green));
    assert!(m.contains(blue));
    assert!(!m.contains(clash_red));
    assert_eq!(m.get(61), red);

    m.push(clash_red);
    assert!(!m.contains(red));
    assert!(m.contains(green));
    assert!(m.contains(blue));
    assert!(m.contains(clash_red));
    assert_eq!(m.get(61), clash_red);

    m.clear();
    assert!(!m.contains(clash_red));
    assert_eq!(m.get(61), [0, 0, 0]);
}

#[test]
fn pixel_hash_map_is_deterministic() {
    let pixels: Vec<[u8; 3]> = (0u16..512)
        .map(|i| [(i % 256) as u8, (i * 7 % 251) as u8, (i * 31 % 256) as u8])
        .collect();

    let mut a = PixelHashMap::new();
    let mut b = PixelHashMap::new();
    for &pixel in &pixels {
        a.push(pixel);
        b.push(pixel);
        assert_eq!(a, b);
    }
}

#[test]
fn zero_pixel_hashes_to_slot_zero() {
    assert_eq!(hash([0, 0, 0]), 0);
    // a freshly cleared table therefore "contains" black
    assert!(PixelHashMap::new().contains([0, 0, 0]));
}

#[test]
fn frame_from_raw_validates_length() {
    assert!(Frame::from_raw(2, 2, vec![0; 12]).is_ok());
    assert!(matches!(
        Frame::from_raw(2, 2, vec![0; 11]),
        Err(Error::InvalidDimensions { .. })
    ));
}

#[test]
fn frame_pixel_accessors_are_row_major() {
    let data: Vec<u8> = (0..18).collect();
    let frame = Frame::from_raw(3, 2, data).unwrap();

    assert_eq!(frame.pixel(0), [0, 1, 2]);
    assert_eq!(frame.pixel(3), [9, 10, 11]);
    assert_eq!(frame.pixels().count(), 6);
    assert_eq!(frame.pixels().last().unwrap(), [15, 16, 17]);
}
