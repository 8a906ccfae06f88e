//! Route table installation against recording and failing tables

use spif_driver::{
    initialize_routes, FixedCore, IndexKind, ProtocolConfig, RouteEntry, RouterTable,
    SoftwareFabric, SpifError,
};

/// Table whose pool is always empty; counts every call.
#[derive(Default)]
struct ExhaustedTable {
    allocs: u32,
    sets: u32,
}

impl RouterTable for ExhaustedTable {
    fn alloc(&mut self, _n: u32) -> Option<u32> {
        self.allocs += 1;
        None
    }

    fn set_entry(&mut self, _slot: u32, _entry: RouteEntry) {
        self.sets += 1;
    }
}

#[test]
fn three_entries_in_order() {
    let mut fabric = SoftwareFabric::with_pool(2, 64);
    fabric.alloc(10).unwrap();

    let routes = initialize_routes(&mut fabric, &FixedCore(2), &ProtocolConfig::default()).unwrap();

    assert_eq!(routes.base_slot, 10);
    assert_eq!(
        fabric.entries(),
        &[
            (10, RouteEntry::new(0xffff_fe00, 0xffff_ff00, 1 << 5)),
            (11, RouteEntry::new(0xffff_ff00, 0xffff_ff00, 1 << 5)),
            (12, RouteEntry::new(0xffff_fd00, 0xffff_ff00, 1 << 8)),
        ]
    );
    assert_eq!(routes.entries[2].route, 1 << 8);
}

#[test]
fn reply_route_follows_identity() {
    for core in 0..18 {
        let mut fabric = SoftwareFabric::new(core);
        let identity = FixedCore(core);
        initialize_routes(&mut fabric, &identity, &ProtocolConfig::default()).unwrap();
        assert_eq!(fabric.route_for(0xffff_fd40), 1 << (core + 6));
        assert_eq!(fabric.route_for(0xffff_ff47), 1 << 5);
        assert_eq!(fabric.route_for(0xffff_fe11), 1 << 5);
    }
}

#[test]
fn exhausted_pool_programs_nothing() {
    let mut table = ExhaustedTable::default();
    let err = initialize_routes(&mut table, &FixedCore(1), &ProtocolConfig::default()).unwrap_err();
    assert_eq!(err, SpifError::RouterAllocation { requested: 3 });
    assert_eq!(table.allocs, 1);
    assert_eq!(table.sets, 0);
}

#[test]
fn second_install_takes_fresh_slots_until_pool_runs_out() {
    let mut fabric = SoftwareFabric::with_pool(1, 7);
    let cfg = ProtocolConfig::default();

    assert_eq!(initialize_routes(&mut fabric, &FixedCore(1), &cfg).unwrap().base_slot, 0);
    assert_eq!(initialize_routes(&mut fabric, &FixedCore(1), &cfg).unwrap().base_slot, 3);
    assert_eq!(
        initialize_routes(&mut fabric, &FixedCore(1), &cfg),
        Err(SpifError::RouterAllocation { requested: 3 })
    );
    assert_eq!(fabric.entries().len(), 6);
}

#[test]
fn impossible_core_allocates_nothing() {
    let mut fabric = SoftwareFabric::new(0);
    let err = initialize_routes(&mut fabric, &FixedCore(18), &ProtocolConfig::default()).unwrap_err();
    assert_eq!(err, SpifError::out_of_range(IndexKind::Core, 18, 18));
    assert_eq!(fabric.allocations(), 0);
    assert!(fabric.entries().is_empty());
}
