use metrics::{counter, gauge};

pub fn record_node_registered() {
    counter!("conhash_nodes_registered_total").increment(1);
}

pub fn record_node_deregistered() {
    counter!("conhash_nodes_deregistered_total").increment(1);
}

pub fn record_ring_reset() {
    counter!("conhash_ring_resets_total").increment(1);
}

pub fn record_lookup(found: bool) {
    let result = if found { "hit" } else { "miss" };
    counter!("conhash_lookups_total", "result" => result).increment(1);
}

pub fn set_ring_size(physical: usize, virtual_positions: usize) {
    gauge!("conhash_physical_nodes").set(physical as f64);
    gauge!("conhash_virtual_nodes").set(virtual_positions as f64);
}
