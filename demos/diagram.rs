use avl_tree::AvlTree;

fn main() {
    let mut tree: AvlTree<i32> = [10, 20, 30, 40, 50, 25].into_iter().collect();
    println!("Before removing 30:");
    print!("{}", tree.diagram());

    tree.remove(&30);
    println!("After removing 30:");
    print!("{}", tree.diagram());

    println!("Pre-order traversal:");
    tree.traverse(|visit| {
        println!(
            "Key: {}, depth: {}, side: {:?}, height: {}",
            visit.key, visit.depth, visit.side, visit.height
        );
    });
}
