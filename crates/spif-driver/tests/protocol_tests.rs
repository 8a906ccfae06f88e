//! Wire-level checks of every configuration operation
//!
//! Each operation is driven through `SpifController` over a `SoftwareFabric`
//! and the recorded packet is compared against `class key | offset`.

use spif_chip::regs::{remote, DiagCounter};
use spif_driver::{
    ConfigOp, ConfigPacket, PacketEncoder, ProtocolConfig, SoftwareFabric, SpifController,
};

const LOCAL: u32 = 0xffff_fe00;
const REMOTE: u32 = 0xffff_ff00;

fn controller() -> SpifController<SoftwareFabric> {
    SpifController::new(SoftwareFabric::new(4)).expect("default config")
}

fn only_packet(spif: &mut SpifController<SoftwareFabric>) -> ConfigPacket {
    let sent = spif.interface_mut().take_sent();
    assert_eq!(sent.len(), 1, "expected exactly one packet, got {sent:?}");
    sent[0]
}

#[test]
fn router_entries_for_every_slot() {
    let mut spif = controller();
    for slot in 0..remote::ROUTER_ENTRIES {
        spif.set_routing_key(slot, 0xaaaa_0000 + slot).unwrap();
        assert_eq!(
            only_packet(&mut spif).triple(),
            (REMOTE | (16 + slot), 0xaaaa_0000 + slot, true)
        );

        spif.set_routing_mask(slot, 0xffff_0000).unwrap();
        assert_eq!(
            only_packet(&mut spif).triple(),
            (REMOTE | (32 + slot), 0xffff_0000, true)
        );

        spif.set_routing_route(slot, 1 << slot).unwrap();
        assert_eq!(
            only_packet(&mut spif).triple(),
            (REMOTE | (48 + slot), 1 << slot, true)
        );
    }
}

#[test]
fn mapper_registers_for_every_mapper_and_field() {
    let mut spif = controller();
    for map in 0..remote::MAPPERS {
        spif.set_mapper_key(map, 0x1000 * (map + 1)).unwrap();
        assert_eq!(
            only_packet(&mut spif).triple(),
            (REMOTE | (72 + map), 0x1000 * (map + 1), true)
        );

        for field in 0..remote::FIELDS_PER_MAPPER {
            spif.set_mapper_field_mask(map, field, 0xff << field).unwrap();
            assert_eq!(
                only_packet(&mut spif).triple(),
                (REMOTE | (80 + map * remote::REGISTERS_PER_MAPPER + field), 0xff << field, true)
            );

            spif.set_mapper_field_shift(map, field, 8).unwrap();
            assert_eq!(
                only_packet(&mut spif).triple(),
                (REMOTE | (96 + map * remote::REGISTERS_PER_MAPPER + field), 8, true)
            );
        }
    }
}

#[test]
fn negative_shift_is_sent_bit_for_bit() {
    let mut spif = controller();
    for shift in [-1, -16, -31] {
        spif.set_mapper_field_shift(1, 3, shift).unwrap();
        let pkt = only_packet(&mut spif);
        assert_eq!(pkt.key, REMOTE | (96 + 4 + 3));
        assert_eq!(pkt.payload, Some(u32::from_ne_bytes(shift.to_ne_bytes())));
        assert_ne!(pkt.payload, Some(shift.unsigned_abs()));
    }
}

#[test]
fn peripheral_and_drop_wait() {
    let mut spif = controller();

    spif.set_peripheral_key(0x0200_0000).unwrap();
    assert_eq!(only_packet(&mut spif).triple(), (LOCAL | 2, 0x0200_0000, true));

    spif.set_peripheral_mask(0xff00_0000).unwrap();
    assert_eq!(only_packet(&mut spif).triple(), (LOCAL | 3, 0xff00_0000, true));

    spif.set_input_drop_wait(64).unwrap();
    assert_eq!(only_packet(&mut spif).triple(), (REMOTE | 71, 64, true));
}

#[test]
fn start_and_stop_differ_only_by_code() {
    let mut spif = controller();
    spif.start_input().unwrap();
    let start = only_packet(&mut spif);
    spif.stop_input().unwrap();
    let stop = only_packet(&mut spif);

    assert_eq!(start.triple(), (LOCAL | 17, 0, false));
    assert_eq!(stop.triple(), (LOCAL | 16, 0, false));
    assert_eq!(start.key ^ stop.key, 17 ^ 16);
}

#[test]
fn counter_read_requests() {
    let mut spif = controller();
    for counter in DiagCounter::ALL {
        spif.read_counter(counter).unwrap();
        assert_eq!(
            only_packet(&mut spif).triple(),
            (REMOTE | counter.register(), 0, false)
        );
    }
}

#[test]
fn counter_reset_sends_whole_block_in_order() {
    let mut spif = controller();
    spif.interface_mut().reject_next(3);
    spif.reset_counters().unwrap();

    let sent = spif.interface().sent();
    assert_eq!(sent.len() as u32, remote::DIAG_COUNTERS);
    for (i, pkt) in sent.iter().enumerate() {
        assert_eq!(pkt.key, REMOTE | (remote::COUNTER_BASE + i as u32));
        assert_eq!(pkt.payload, Some(0));
        assert!(pkt.has_payload());
    }
    assert!(sent.windows(2).all(|w| w[1].key == w[0].key + 1));
    assert_eq!(spif.interface().attempts(), u64::from(remote::DIAG_COUNTERS) + 3);
}

#[test]
fn encoding_is_pure() {
    let encoder = PacketEncoder::default();
    let ops = [
        ConfigOp::PeripheralKey(5),
        ConfigOp::RouterRoute { slot: 3, route: 9 },
        ConfigOp::MapperFieldShift {
            mapper: 0,
            field: 1,
            shift: -2,
        },
        ConfigOp::Start,
        ConfigOp::ReadCounter { register: 65 },
    ];
    for op in &ops {
        assert_eq!(encoder.encode(op), encoder.encode(op));
    }
    let twice: Vec<_> = encoder
        .counter_reset_sequence()
        .chain(encoder.counter_reset_sequence())
        .collect();
    assert_eq!(twice[..4], twice[4..]);
}

#[test]
fn packets_leave_in_program_order_despite_rejections() {
    let mut spif = controller();
    spif.set_peripheral_key(1).unwrap();
    spif.interface_mut().reject_next(7);
    spif.set_peripheral_mask(2).unwrap();
    spif.start_input().unwrap();

    let keys: Vec<u32> = spif.interface().sent().iter().map(|p| p.key).collect();
    assert_eq!(keys, vec![LOCAL | 2, LOCAL | 3, LOCAL | 17]);
}

#[test]
fn injected_constants_drive_encoding() {
    let mut classes = spif_driver::ClassKeys::default();
    classes.remote_config.key = 0x8000_0000;
    let cfg = ProtocolConfig::default().with_classes(classes);

    let mut spif = SpifController::with_config(SoftwareFabric::new(0), cfg).unwrap();
    spif.set_input_drop_wait(1).unwrap();
    assert_eq!(only_packet(&mut spif).key, 0x8000_0000 | 71);
}
