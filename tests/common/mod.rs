//! A tiny interpreter for the subset of Jasmin the compiler emits, so tests
//! can check what a compiled program prints.

use std::collections::HashMap;

const MAX_STEPS: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Int(i32),
    Str(String),
    Stream,
}

#[derive(Debug, Default)]
struct Method {
    code: Vec<Vec<String>>,
    labels: HashMap<String, usize>,
}

pub struct Machine {
    methods: HashMap<String, Method>,
    output: Vec<String>,
    steps: usize,
}

impl Machine {
    pub fn load(asm: &str) -> Self {
        let mut methods = HashMap::new();
        let mut current: Option<(String, Method)> = None;
        for raw in asm.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            if let Some(rest) = line.strip_prefix(".method") {
                let signature = rest.split_whitespace().last().unwrap().to_string();
                current = Some((signature, Method::default()));
            } else if line == ".end method" {
                let (signature, method) = current.take().expect(".end without .method");
                // The verifier rejects branch targets past the last instruction
                if let Some(label) = method.labels.iter().find_map(|(label, at)| {
                    (*at == method.code.len()).then_some(label)
                }) {
                    panic!("label {} ends method {} with no code after it", label, signature);
                }
                methods.insert(signature, method);
            } else if line.starts_with('.') {
                continue;
            } else if let Some(label) = line.strip_suffix(':') {
                let (_, method) = current.as_mut().expect("label outside method");
                method.labels.insert(label.to_string(), method.code.len());
            } else {
                let (_, method) = current.as_mut().expect("instruction outside method");
                let inst = match line.split_once(' ') {
                    Some(("ldc", operand)) => vec!["ldc".to_string(), operand.to_string()],
                    _ => line.split_whitespace().map(str::to_string).collect(),
                };
                method.code.push(inst);
            }
        }
        Machine {
            methods,
            output: Vec::new(),
            steps: 0,
        }
    }

    /// Runs `main` and returns every printed line
    pub fn run_main(mut self) -> Vec<String> {
        self.call("main([Ljava/lang/String;)V", &[]);
        self.output
    }

    fn call(&mut self, signature: &str, args: &[i32]) -> Option<i32> {
        let method = self
            .methods
            .get(signature)
            .unwrap_or_else(|| panic!("no method {}", signature));
        let code = method.code.clone();
        let labels = method.labels.clone();

        let mut locals = vec![0i32; 32];
        let first = if signature.starts_with("main(") { 1 } else { 0 };
        locals[first..first + args.len()].copy_from_slice(args);
        let mut stack: Vec<Value> = Vec::new();
        let mut pc = 0;

        let pop_int = |stack: &mut Vec<Value>| match stack.pop() {
            Some(Value::Int(n)) => n,
            other => panic!("expected an int on the stack, found {:?}", other),
        };

        loop {
            self.steps += 1;
            assert!(self.steps < MAX_STEPS, "program did not terminate");
            let inst = code.get(pc).unwrap_or_else(|| panic!("fell off the end of {}", signature));
            pc += 1;
            let op = inst[0].as_str();
            match op {
                "ldc" => {
                    let operand = &inst[1];
                    if let Some(text) = operand.strip_prefix('"') {
                        stack.push(Value::Str(text.trim_end_matches('"').to_string()));
                    } else {
                        stack.push(Value::Int(operand.parse().unwrap()));
                    }
                }
                "iload" => stack.push(Value::Int(locals[inst[1].parse::<usize>().unwrap()])),
                "istore" => locals[inst[1].parse::<usize>().unwrap()] = pop_int(&mut stack),
                _ if op.starts_with("iload_") => {
                    stack.push(Value::Int(locals[op[6..].parse::<usize>().unwrap()]))
                }
                _ if op.starts_with("istore_") => {
                    locals[op[7..].parse::<usize>().unwrap()] = pop_int(&mut stack)
                }
                "iadd" | "isub" => {
                    let b = pop_int(&mut stack);
                    let a = pop_int(&mut stack);
                    let r = if op == "iadd" {
                        a.wrapping_add(b)
                    } else {
                        a.wrapping_sub(b)
                    };
                    stack.push(Value::Int(r));
                }
                "goto" => pc = labels[&inst[1]],
                _ if op.starts_with("if_icmp") => {
                    let b = pop_int(&mut stack);
                    let a = pop_int(&mut stack);
                    let taken = match &op[7..] {
                        "eq" => a == b,
                        "ne" => a != b,
                        "lt" => a < b,
                        "ge" => a >= b,
                        "gt" => a > b,
                        "le" => a <= b,
                        other => panic!("unknown comparison {}", other),
                    };
                    if taken {
                        pc = labels[&inst[1]];
                    }
                }
                "getstatic" => stack.push(Value::Stream),
                "invokevirtual" => {
                    let value = stack.pop().expect("println without an argument");
                    assert_eq!(stack.pop(), Some(Value::Stream));
                    match value {
                        Value::Int(n) => self.output.push(n.to_string()),
                        Value::Str(s) => self.output.push(s),
                        Value::Stream => panic!("printing the stream itself"),
                    }
                }
                "invokestatic" => {
                    let target = inst[1].split_once('/').unwrap().1.to_string();
                    let params = &target[target.find('(').unwrap() + 1..target.find(')').unwrap()];
                    let mut args = vec![0; params.len()];
                    for slot in args.iter_mut().rev() {
                        *slot = pop_int(&mut stack);
                    }
                    let result = self.call(&target, &args).expect("int method returned nothing");
                    stack.push(Value::Int(result));
                }
                "ireturn" => return Some(pop_int(&mut stack)),
                "return" => return None,
                other => panic!("unsupported instruction {}", other),
            }
        }
    }
}

pub fn run(asm: &str) -> Vec<String> {
    Machine::load(asm).run_main()
}
