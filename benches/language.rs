//! End-to-end benchmarks over small programs, one per dispatch mechanism:
//! plain loops, function calls, closures, methods, and super calls.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use loxa::VM;

fn bench_program(c: &mut Criterion, name: &str, src: &str) {
    c.bench_function(name, |b| {
        let mut vm = VM::default();
        b.iter(|| vm.interpret(black_box(src)));
    });
}

pub fn arithmetic_loop(c: &mut Criterion) {
    bench_program(
        c,
        "arithmetic_loop",
        r#"
var total = 0;
for (var i = 1; i <= 20000; i = i + 1) {
    total = total + i * 3 - i / 2;
}
"#,
    );
}

pub fn recursive_calls(c: &mut Criterion) {
    bench_program(
        c,
        "recursive_calls",
        r#"
fun fib(n) {
    if (n < 2) return n;
    return fib(n - 1) + fib(n - 2);
}
fib(18);
"#,
    );
}

pub fn closure_counters(c: &mut Criterion) {
    bench_program(
        c,
        "closure_counters",
        r#"
fun makeCounter() {
    var count = 0;
    fun tick() {
        count = count + 1;
        return count;
    }
    return tick;
}
var burst = 0;
while (burst < 200) {
    var tick = makeCounter();
    for (var i = 0; i < 50; i = i + 1) tick();
    burst = burst + 1;
}
"#,
    );
}

pub fn method_dispatch(c: &mut Criterion) {
    bench_program(
        c,
        "method_dispatch",
        r#"
class Vector {
    init(x, y) { this.x = x; this.y = y; }
    dot(other) { return this.x * other.x + this.y * other.y; }
    scale(k) { return Vector(this.x * k, this.y * k); }
}
var v = Vector(3, 4);
var acc = 0;
for (var i = 0; i < 4000; i = i + 1) {
    acc = acc + v.scale(2).dot(v);
}
"#,
    );
}

pub fn super_dispatch(c: &mut Criterion) {
    bench_program(
        c,
        "super_dispatch",
        r#"
class Account {
    init(balance) { this.balance = balance; }
    deposit(amount) { this.balance = this.balance + amount; }
}
class Audited < Account {
    init(balance) {
        super.init(balance);
        this.deposits = 0;
    }
    deposit(amount) {
        super.deposit(amount);
        this.deposits = this.deposits + 1;
    }
}
var account = Audited(0);
for (var i = 0; i < 5000; i = i + 1) {
    account.deposit(1);
}
"#,
    );
}

criterion_group!(
    language,
    arithmetic_loop,
    recursive_calls,
    closure_counters,
    method_dispatch,
    super_dispatch,
);
criterion_main!(language);
