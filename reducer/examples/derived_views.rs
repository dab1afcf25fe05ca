use std::rc::Rc;

use dyn_reducer::{Filter, Reducer, Sort};

fn main() {
    let scores = Reducer::new(vec![42i64, 7, 99, 13, 56, 3, 88]);

    scores
        .filters()
        .add(Filter::new(|v: &i64| *v >= 10).with_id("double-digits"))
        .unwrap();
    scores.sort().set(Sort::new(|a: &i64, b| b.cmp(a))).unwrap();
    println!("top-down: {:?}", scores.to_vec());

    let podium = scores.derived().create("podium").unwrap();
    podium.filters().add_fn(|v| *v >= 50).unwrap();
    println!("podium:   {:?}", podium.to_vec());

    let _sub = scores.subscribe(Rc::new(|r| {
        println!("view changed, {} surviving", r.len());
    }));

    scores.set_data(vec![42, 7, 99, 13, 56, 3, 88, 61], false);
    println!("podium after new entry: {:?}", podium.to_vec());
}
