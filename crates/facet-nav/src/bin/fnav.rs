// Copyright 2026 FacetNav Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::{Context, Result};
use clap::Parser;
use facet_nav::{
    load_nav_config, parse_facet_specs, FacetNav, MemoryDoc, MemoryProvider, MergeOpts, NavConfig,
    TypedValue,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fnav", about = "Navigate a faceted tree over a JSON corpus (demo)")]
struct Args {
    /// Path to a JSON corpus file: {"documents": [{id, path, props, text}]}
    corpus: std::path::PathBuf,
    /// Facet descriptor, repeatable (e.g. "price$[{name:'cheap', end:10000}, {}]")
    #[arg(long = "facet")]
    facets: Vec<String>,
    /// Output node name override, repeatable; count must match --facet
    #[arg(long = "node-name")]
    node_names: Vec<String>,
    /// Docbase identifier (defaults to "default")
    #[arg(long)]
    docbase: Option<String>,
    /// Tree path to resolve, slash separated (e.g. "brand/peugeot/resultset")
    #[arg(long, default_value = "")]
    path: String,
    /// Free-text overlay term
    #[arg(long)]
    free_text: Option<String>,
    /// Optional TOML config file (docbase, max_depth, deadline_ms)
    #[arg(long)]
    config: Option<std::path::PathBuf>,
    #[arg(long)]
    max_depth: Option<usize>,
    #[arg(long)]
    deadline_ms: Option<u64>,
    /// Emit JSON instead of plain text
    #[arg(long)]
    json: bool,
}

#[derive(Deserialize)]
struct Corpus {
    documents: Vec<CorpusDoc>,
}

#[derive(Deserialize)]
struct CorpusDoc {
    id: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    props: BTreeMap<String, Vec<serde_json::Value>>,
    #[serde(default)]
    text: Option<String>,
}

fn to_typed(v: &serde_json::Value) -> Option<TypedValue> {
    match v {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(TypedValue::Long(i))
            } else {
                n.as_f64().map(TypedValue::Double)
            }
        }
        serde_json::Value::String(s) => {
            if let Ok(d) = chrono::DateTime::parse_from_rfc3339(s) {
                Some(TypedValue::Date(d.with_timezone(&chrono::Utc)))
            } else {
                Some(TypedValue::Str(s.clone()))
            }
        }
        other => {
            tracing::warn!(value = %other, "skipping unsupported property value");
            None
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let docbase = args.docbase.clone().unwrap_or_else(|| "default".into());

    let config = load_nav_config(
        NavConfig::default(),
        MergeOpts {
            config_path: args.config.clone(),
            cli_docbase: Some(docbase.clone()),
            cli_max_depth: args.max_depth,
            cli_deadline_ms: args.deadline_ms,
        },
    )?;

    let raw = std::fs::read_to_string(&args.corpus)
        .with_context(|| format!("reading corpus {:?}", args.corpus))?;
    let corpus: Corpus = serde_json::from_str(&raw).context("parsing corpus JSON")?;

    let provider = Arc::new(MemoryProvider::new());
    for doc in corpus.documents {
        let mut mem = MemoryDoc::new(doc.id, doc.path);
        for (prop, values) in doc.props {
            let typed: Vec<TypedValue> = values.iter().filter_map(to_typed).collect();
            mem = mem.prop(prop, typed);
        }
        if let Some(text) = doc.text {
            mem = mem.text(text);
        }
        provider.add_doc(&docbase, mem);
    }

    let specs = parse_facet_specs(&args.facets, &args.node_names)?;
    let opts = config.expand_opts();
    let nav = FacetNav::new(provider, specs, config);
    let view = match args.free_text.as_deref() {
        Some(term) => nav.view().with_free_text(term),
        None => nav.view(),
    };

    let segments: Vec<&str> = args.path.split('/').filter(|s| !s.is_empty()).collect();
    let node = view.get_node(&segments, &opts)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&node)?);
    } else {
        println!("{} (count: {})", display_name(&node.name), node.count);
        for (name, count) in &node.children {
            println!("  {}  {}", count, name);
        }
        if let Some(docs) = &node.documents {
            for d in docs {
                println!("  doc {}  {}", d.id, d.path);
            }
        }
    }
    Ok(())
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "(root)"
    } else {
        name
    }
}
