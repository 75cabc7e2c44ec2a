use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use scriptlint_core::{
    Document, GlobalDeclaredVariableSet, LineIndex, MemoryOutputStream, NullDiagReporter,
    PaddedString, Translator, VimQflistJsonDiagReporter, VimSource, parse_and_lint,
};

fn large_module(function_count: usize) -> String {
    let mut out = String::with_capacity(function_count * 160);
    out.push_str("import { readFile } from 'fs';\n");
    for i in 0..function_count {
        out.push_str(&format!(
            "export async function handler{i:05}(request, {{ retries = 3 }}) {{\n\
             \x20 const body = await readFile(`/tmp/${{request.id}}-{i}.json`, 'utf-8');\n\
             \x20 for (let attempt = 0; attempt < retries; ++attempt) console.log(body, attempt);\n\
             \x20 return JSON.parse(body)?.items ?? [];\n\
             }}\n"
        ));
    }
    out
}

fn bench_lint_large_module(c: &mut Criterion) {
    let input = PaddedString::from(large_module(2_000).as_str());
    let globals = GlobalDeclaredVariableSet::with_all_groups();
    c.bench_function("lint/2k_functions", |b| {
        b.iter(|| parse_and_lint(black_box(input.view()), &mut NullDiagReporter, &globals))
    });
}

fn bench_vim_qflist_many_diagnostics(c: &mut Criterion) {
    let mut source = String::new();
    for i in 0..5_000 {
        source.push_str(&format!("undeclared{i} = missing{i};\n"));
    }
    let input = PaddedString::from(source.as_str());
    let globals = GlobalDeclaredVariableSet::with_all_groups();
    c.bench_function("vim_qflist/10k_diagnostics", |b| {
        b.iter(|| {
            let mut reporter =
                VimQflistJsonDiagReporter::new(Translator::new(), MemoryOutputStream::new());
            reporter.set_source(
                input.view(),
                VimSource {
                    file_name: Some("bench.js"),
                    bufnr: Some(1),
                },
            );
            parse_and_lint(input.view(), &mut reporter, &globals);
            reporter.finish().unwrap();
            black_box(reporter.into_inner().get_flushed_string8().len());
        })
    });
}

fn bench_line_index_edits(c: &mut Criterion) {
    let text = large_module(2_000).into_bytes();
    c.bench_function("line_index/100_incremental_edits", |b| {
        b.iter_batched(
            || (text.clone(), LineIndex::from_text(&text)),
            |(mut text, mut index)| {
                let mut offset = text.len() / 2;
                for _ in 0..100 {
                    text.splice(offset..offset, b"x\n".iter().copied());
                    index.replace_text(offset..offset, &text);
                    offset += 2;
                }
                black_box(index.line_count());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_document_relint(c: &mut Criterion) {
    let source = large_module(500);
    let mut doc = Document::new();
    doc.set_text(source.as_bytes());
    c.bench_function("document/edit_and_relint", |b| {
        b.iter(|| {
            doc.replace_text(0..0, b"let extra;\n").unwrap();
            black_box(doc.lint().len());
            doc.replace_text(0..11, b"").unwrap();
        })
    });
}

criterion_group!(
    benches,
    bench_lint_large_module,
    bench_vim_qflist_many_diagnostics,
    bench_line_index_edits,
    bench_document_relint
);
criterion_main!(benches);
