use avl_tree::AvlTree;

fn main() {
    let mut tree = AvlTree::new();
    tree.insert(0);
    tree.insert(1);
    tree.insert(2);
    tree.insert(2);
    tree.insert(3);
    tree.insert(4);
    tree.insert(5);
    assert_eq!(tree.len(), 6);
    assert_eq!(tree.get(&1), Some(&1));
    tree.remove(&1);
    assert!(!tree.contains(&1));

    print!("{{ ");
    for key in &tree {
        print!("{key}, ");
    }
    println!("}}");
    println!("height: {}", tree.height());
}
