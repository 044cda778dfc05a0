/*!
Tests for the split of the memory among routers.
 */

use dragonfly_lib::address::{register_topology, AddressMap};
use dragonfly_lib::config::{DragonflyOptions, MemorySize};

#[derive(Default)]
struct RecordingMap
{
    registered: Vec<(Vec<usize>, u64, usize)>,
}

impl AddressMap for RecordingMap
{
    fn register_node(&mut self, nodes: &[usize], size: u64, region: usize)
    {
        self.registered.push((nodes.to_vec(), size, region));
    }
}

#[test]
fn one_range_per_router()
{
    let mut options = DragonflyOptions::sized(18, 2, 4);
    options.mem_size = "576MB".parse().expect("valid size");
    let mut map = RecordingMap::default();
    let layout = register_topology(&options, &mut map).expect("valid layout");
    assert_eq!(map.registered.len(), 18);
    for (index, (nodes, size, region)) in map.registered.iter().enumerate()
    {
        assert_eq!(nodes, &vec![index]);
        assert_eq!(*size, 32 << 20);
        assert_eq!(*region, index);
    }
    for pair in layout.ranges.windows(2)
    {
        assert_eq!(pair[0].end(), pair[1].start);
    }
    assert_eq!(layout.unassigned_bytes(), 0);
    assert_eq!(layout.region_of(100 << 20), Some(3));
}

#[test]
fn remainder_is_left_unassigned()
{
    let mut options = DragonflyOptions::sized(6, 2, 1);
    options.mem_size = MemorySize(1000);
    let mut map = RecordingMap::default();
    let layout = register_topology(&options, &mut map).expect("valid layout");
    assert!(map.registered.iter().all(|(_, size, _)| *size == 166));
    assert_eq!(layout.unassigned_bytes(), 4);
    assert_eq!(layout.ranges.last().map(|range| range.end()), Some(996));
    assert_eq!(layout.region_of(996), None);
}

#[test]
fn zero_routers_is_an_error()
{
    let mut options = DragonflyOptions::default();
    options.num_cpus = 0;
    let mut map = RecordingMap::default();
    assert!(register_topology(&options, &mut map).is_err());
    assert!(map.registered.is_empty());
}
