use super::*;
#[path = "partition_property_tests.rs"]
mod partition_property_tests;

#[test]
fn partition_map_rejects_zero_parts() {
    assert_eq!(PartitionMap::new(vec![], 0), Err(PartitionError::NoParts));
}

#[test]
fn partition_map_rejects_out_of_range_part() {
    match PartitionMap::new(vec![0, 1, 3], 2) {
        Err(PartitionError::PartOutOfRange {
            vertex,
            part,
            num_parts,
        }) => assert_eq!((vertex, part, num_parts), (2, 3, 2)),
        other => panic!("Unexpected result: {:?}", other),
    }
}

#[test]
fn partition_map_rejects_extra_vertices() {
    let g = AdjacencyList::from_undirected(2, &[(0, 1, 1)]);
    let pm = PartitionMap::new(vec![0, 1, 1], 2).unwrap();
    assert_eq!(
        pm.check_covers(&g),
        Err(PartitionError::LengthMismatch {
            assigned: 3,
            expected: 2
        })
    );
}

#[test]
fn part_sizes_count_empty_parts() {
    let pm = PartitionMap::new(vec![2, 2, 0], 4).unwrap();
    assert_eq!(pm.part_sizes(), vec![1, 0, 2, 0]);
    assert_eq!(pm.part_of(1), Ok(2));
    assert_eq!(pm.part_of(5), Err(PartitionError::MissingPartition(5)));
}
