use super::*;

#[test]
fn fnv_hash_is_stable_and_length_prefixed() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"zepp");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"ze");
    b.write_bytes(b"pp");
    assert_eq!(a.finish(), b.finish());

    let mut c = Fnv1a64::new_default();
    c.write_str("ab");
    c.write_str("c");
    let mut d = Fnv1a64::new_default();
    d.write_str("a");
    d.write_str("bc");
    assert_ne!(c.finish(), d.finish());
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(255, 0), 0);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u16(1, 127), 0);
    assert_eq!(mul_div255_u16(1, 128), 1);
}
