//! Loopback handshake between a host and a node

use serlink::{ConnectOutcome, Context, Host, MemoryTransport, Node, NodeConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Serlink Handshake Example");
    println!("=========================\n");

    let (host_end, node_end) = MemoryTransport::pair();
    let mut node = Node::new(node_end, NodeConfig::with_node_id(1))?;
    let mut host = Host::new(host_end);

    // Lock/unlock an axis: payload is [axis, state]
    node.register_handler(0x02, |payload: &[u8], _: &mut Context<'_>| {
        println!("node: lock command {payload:02x?}");
        Ok(())
    })?;

    let outcome = host.connect(1, || node.poll().map(|_| ()))?;
    println!("host: handshake outcome {outcome:?}");

    if outcome == ConnectOutcome::Connected {
        host.send(0x02, &[0x01, 0x01])?;
        node.poll()?;
    }

    println!("\nnode metrics: {:?}", node.metrics());
    println!("host metrics: {:?}", host.metrics());

    Ok(())
}
