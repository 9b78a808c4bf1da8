use flow::analysis::{
    dead_code_elimination, def_use, faint_variables, live_variables, live_variables_with,
    reaching_definitions, Entity,
};
use flow::error::ErrorKind;
use flow::ir::*;
use flow::{Config, NoExitBlock};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct Diamond {
    function: Function,
    entry: usize,
    left: usize,
    right: usize,
    join: usize,
    c: InstructionId,
    x: InstructionId,
    y: InstructionId,
    p: InstructionId,
}

// entry: c = a == 0, branch to left or right
// left: x = a + 1
// right: y = a - 1
// join: p = phi(x, y), return p
fn diamond() -> Diamond {
    let mut function = Function::new("diamond");
    let a = function.add_argument("a", Type::Integer(32));
    let entry = function.new_block("entry").unwrap();
    let left = function.new_block("left").unwrap();
    let right = function.new_block("right").unwrap();
    let join = function.new_block("join").unwrap();

    let c = function
        .append(entry, compare(CompareOp::Eq, a.clone(), constant(0, 32)))
        .unwrap();
    function
        .append(entry, conditional_branch(instruction(c), left, right))
        .unwrap();
    let x = function
        .append(left, add(a.clone(), constant(1, 32), 32))
        .unwrap();
    function.append(left, branch(join)).unwrap();
    let y = function.append(right, sub(a, constant(1, 32), 32)).unwrap();
    function.append(right, branch(join)).unwrap();
    let p = function
        .append(join, phi(vec![(left, instruction(x)), (right, instruction(y))], 32))
        .unwrap();
    function
        .append(join, return_(Some(instruction(p))))
        .unwrap();

    Diamond {
        function,
        entry,
        left,
        right,
        join,
        c,
        x,
        y,
        p,
    }
}

// entry -> header <-> body, header -> exit, with a value `dead` carried
// around the loop and never used outside it.
fn counting_loop() -> (Function, InstructionId, InstructionId) {
    let mut function = Function::new("counting_loop");
    let n = function.add_argument("n", Type::Integer(32));
    let entry = function.new_block("entry").unwrap();
    let header = function.new_block("header").unwrap();
    let body = function.new_block("body").unwrap();
    let exit = function.new_block("exit").unwrap();

    function.append(entry, branch(header)).unwrap();
    let i = function
        .append(header, phi(vec![(entry, constant(0, 32))], 32))
        .unwrap();
    let dead = function
        .append(header, phi(vec![(entry, constant(1, 32))], 32))
        .unwrap();
    let c = function
        .append(header, compare(CompareOp::Ltu, instruction(i), n))
        .unwrap();
    function
        .append(header, conditional_branch(instruction(c), body, exit))
        .unwrap();
    let i_next = function
        .append(body, add(instruction(i), constant(1, 32), 32))
        .unwrap();
    let dead_next = function
        .append(body, mul(instruction(dead), constant(2, 32), 32))
        .unwrap();
    function.append(body, branch(header)).unwrap();
    function.add_phi_incoming(i, body, instruction(i_next)).unwrap();
    function.add_phi_incoming(dead, body, instruction(dead_next)).unwrap();
    function
        .append(exit, return_(Some(instruction(i))))
        .unwrap();

    (function, dead, dead_next)
}

#[test]
fn reaching_definitions_merge_at_join() {
    init();
    let d = diamond();
    let rd = reaching_definitions(&d.function).unwrap();

    let join_in = rd.in_state(d.join).unwrap();
    let reaching = rd.entities().entities_in(join_in);
    assert_eq!(
        reaching,
        vec![
            Entity::Instruction(d.c),
            Entity::Instruction(d.x),
            Entity::Instruction(d.y)
        ]
    );

    assert!(!rd.contains(rd.out_state(d.left).unwrap(), &Entity::Instruction(d.y)));
    assert!(!rd.contains(rd.out_state(d.right).unwrap(), &Entity::Instruction(d.x)));
    assert!(rd.in_state(d.entry).unwrap().is_empty());
    assert!(rd.contains(rd.out_state(d.join).unwrap(), &Entity::Instruction(d.p)));
}

#[test]
fn liveness_follows_phi_edges() {
    init();
    let d = diamond();
    let live = live_variables(&d.function).unwrap();

    assert_eq!(
        live.entities().entities_in(live.out_state(d.left).unwrap()),
        vec![Entity::Instruction(d.x)]
    );
    assert_eq!(
        live.entities().entities_in(live.out_state(d.right).unwrap()),
        vec![Entity::Instruction(d.y)]
    );
    assert_eq!(
        live.entities().entities_in(live.in_state(d.entry).unwrap()),
        vec![Entity::Argument(0)]
    );
    assert!(live.out_state(d.join).unwrap().is_empty());
}

#[test]
fn commits_are_bounded() {
    init();
    let (function, _, _) = counting_loop();
    let blocks = function.blocks().len();

    let results = vec![
        reaching_definitions(&function).unwrap(),
        live_variables(&function).unwrap(),
        faint_variables(&function).unwrap(),
    ];
    for result in results {
        let universe = result.entities().len();
        assert!(result.block_states().commits() <= blocks * (universe + 1));
    }
}

#[test]
fn dead_code_elimination_reaches_a_fixed_point() {
    init();
    let (mut function, dead, dead_next) = counting_loop();
    let before = function.num_instructions();

    assert!(dead_code_elimination(&mut function).unwrap());
    assert!(!function.contains(dead));
    assert!(!function.contains(dead_next));
    assert_eq!(function.num_instructions(), before - 2);

    let snapshot = format!("{}", function);
    assert!(!dead_code_elimination(&mut function).unwrap());
    assert_eq!(format!("{}", function), snapshot);

    // Nothing left refers to a removed instruction.
    for (_, users) in def_use(&function) {
        for user in users {
            assert!(function.contains(user));
        }
    }
}

#[test]
fn dead_code_elimination_keeps_diamond() {
    init();
    let mut d = diamond();
    assert!(!dead_code_elimination(&mut d.function).unwrap());
    for id in &[d.c, d.x, d.y, d.p] {
        assert!(d.function.contains(*id));
    }
}

#[test]
fn functions_without_exits() {
    init();
    let mut function = Function::new("spin");
    let a = function.add_argument("a", Type::Integer(32));
    let entry = function.new_block("entry").unwrap();
    let spin = function.new_block("spin").unwrap();
    function.append(entry, branch(spin)).unwrap();
    let x = function.append(spin, add(a, constant(1, 32), 32)).unwrap();
    function.append(spin, branch(spin)).unwrap();

    let config = Config::default().with_no_exit_block(NoExitBlock::Reject);
    let error = live_variables_with(&function, &config).unwrap_err();
    match error.kind() {
        ErrorKind::NoExitBlock(name) => assert_eq!(name, "spin"),
        kind => panic!("expected NoExitBlock, got {:?}", kind),
    }

    let live = live_variables(&function).unwrap();
    assert!(live.contains(live.in_state(entry).unwrap(), &Entity::Argument(0)));
    assert!(!live.contains(live.in_state(spin).unwrap(), &Entity::Instruction(x)));

    // With no boundary, nothing in the loop is ever needed.
    let faint = faint_variables(&function).unwrap();
    assert!(faint.in_state(entry).unwrap().is_full());
}
