use std::cell::RefCell;
use std::rc::Rc;

use position_tween::{
    Easing, Positionable, Props, Target, TweenOptions, TweenScheduler, Tweener,
};

struct Panel {
    x: f64,
    opacity: f64,
}

impl Positionable for Panel {
    fn get(&self, out: &mut Props) {
        out.insert("x".to_string(), self.x);
        out.insert("opacity".to_string(), self.opacity);
    }

    fn set(&mut self, data: &Props) {
        if let Some(x) = data.get("x") {
            self.x = *x;
        }
        if let Some(o) = data.get("opacity") {
            self.opacity = *o;
        }
    }
}

fn main() {
    let scheduler = TweenScheduler::new();
    let tweener = Tweener::new(&scheduler);

    let panel = Rc::new(RefCell::new(Panel { x: 0.0, opacity: 0.0 }));
    let target: Target = panel.clone();

    let mut props = Props::new();
    props.insert("x".to_string(), 320.0);
    props.insert("opacity".to_string(), 1.0);
    let control = tweener
        .to(
            &target,
            props,
            TweenOptions::new()
                .with_duration_ms(400)
                .with_ease(Easing::EaseInOutCubic),
        )
        .expect("panel has both keys");
    control.finished().on_resolve(|result| {
        println!("done, cancelled={}", result.cancelled);
    });

    // A host frame loop, 16 ms per frame.
    let mut now_ms = 0;
    while scheduler.has_work() {
        scheduler.tick(now_ms);
        let p = panel.borrow();
        println!("t={now_ms:3}ms  x={:6.1}  opacity={:.2}", p.x, p.opacity);
        now_ms += 16;
    }
}
