use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use micro_http_core::buffer::Buffer;
use micro_http_core::hash::{HashTable, SeededFnv, TableEntry};
use micro_http_core::pipeline::Pipeline;

struct Field {
    name: String,
    value: usize,
}

impl TableEntry for Field {
    type Key = str;

    fn key(&self) -> &str {
        &self.name
    }
}

fn bench_buffer(c: &mut Criterion) {
    let line = b"the world is not enough\r\n";

    c.bench_function("buffer_write_read", |b| {
        let mut buffer = Buffer::new(16);
        let mut dest = [0u8; 25];
        b.iter(|| {
            for _ in 0..64 {
                buffer.write(line);
            }
            while buffer.read(&mut dest) > 0 {
                black_box(&dest);
            }
        });
    });
}

fn bench_hash_table(c: &mut Criterion) {
    let names: Vec<String> = (0..256).map(|i| format!("x-field-{i}")).collect();

    c.bench_function("hash_table_put", |b| {
        b.iter_batched(
            || HashTable::<Field, SeededFnv>::new(SeededFnv, 0x5eed, 4),
            |mut table| {
                for (value, name) in names.iter().enumerate() {
                    table.put(Field { name: name.clone(), value });
                }
                table
            },
            BatchSize::SmallInput,
        );
    });

    let mut table = HashTable::<Field, SeededFnv>::new(SeededFnv, 0x5eed, 4);
    for (value, name) in names.iter().enumerate() {
        table.put(Field { name: name.clone(), value });
    }

    c.bench_function("hash_table_get", |b| {
        b.iter(|| {
            for name in &names {
                black_box(table.get(name.as_str()).map(|field| field.value));
            }
        });
    });
}

fn bench_pipeline(c: &mut Criterion) {
    c.bench_function("pipeline_complete_in_reverse", |b| {
        b.iter_batched_ref(
            Pipeline::<usize>::new,
            |pipeline| {
                let ids: Vec<_> = (0..32).map(|i| pipeline.push_back(i)).collect();
                for id in ids.into_iter().rev() {
                    pipeline.mark_complete(id);
                }
                while let Some(value) = pipeline.pop_completed() {
                    black_box(value);
                }
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_buffer, bench_hash_table, bench_pipeline);
criterion_main!(benches);
