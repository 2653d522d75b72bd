//! Pattern based patching of third party sources before a build.
use std::path::Path;
use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Context;
use regex::Captures;
use regex::NoExpand;
use regex::Regex;
use subpack_filesystem::FileSystem;
use subpack_packager_js::async_loads::REMOVE_BEGIN_MARKER;
use subpack_packager_js::async_loads::REMOVE_END_MARKER;
use tracing::debug;
use tracing::info;

const DCLOUDIO_DIR: &str = "node_modules/@dcloudio";

type ComputeFn = Box<dyn Fn(&Captures<'_>) -> anyhow::Result<String> + Send + Sync>;

pub enum Pattern {
  Literal(String),
  Regex(Regex),
}

impl std::fmt::Display for Pattern {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Pattern::Literal(literal) => write!(f, "string: \"{literal}\""),
      Pattern::Regex(regex) => write!(f, "regex: \"{}\"", regex.as_str()),
    }
  }
}

pub enum Replacement {
  Text(String),
  /// Computed from the captures of a regex pattern
  Computed(ComputeFn),
}

/// Replaces the first occurrence of a pattern.
pub struct Replacer {
  pattern: Pattern,
  replacement: Replacement,
}

impl Replacer {
  pub fn literal(from: impl Into<String>, to: impl Into<String>) -> Self {
    Replacer {
      pattern: Pattern::Literal(from.into()),
      replacement: Replacement::Text(to.into()),
    }
  }

  pub fn regex(pattern: &str, to: impl Into<String>) -> anyhow::Result<Self> {
    Ok(Replacer {
      pattern: Pattern::Regex(Regex::new(pattern)?),
      replacement: Replacement::Text(to.into()),
    })
  }

  pub fn computed(
    pattern: &str,
    compute: impl Fn(&Captures<'_>) -> anyhow::Result<String> + Send + Sync + 'static,
  ) -> anyhow::Result<Self> {
    Ok(Replacer {
      pattern: Pattern::Regex(Regex::new(pattern)?),
      replacement: Replacement::Computed(Box::new(compute)),
    })
  }

  fn matches(&self, input: &str) -> bool {
    match &self.pattern {
      Pattern::Literal(literal) => input.contains(literal.as_str()),
      Pattern::Regex(regex) => regex.is_match(input),
    }
  }

  fn apply(&self, input: &str) -> anyhow::Result<String> {
    match (&self.pattern, &self.replacement) {
      (Pattern::Literal(literal), Replacement::Text(text)) => {
        Ok(input.replacen(literal.as_str(), text, 1))
      }
      (Pattern::Literal(literal), Replacement::Computed(_)) => Err(anyhow!(
        "computed replacements need a regex pattern, got \"{literal}\""
      )),
      (Pattern::Regex(regex), Replacement::Text(text)) => {
        Ok(regex.replacen(input, 1, NoExpand(text)).into_owned())
      }
      (Pattern::Regex(regex), Replacement::Computed(compute)) => {
        let Some(captures) = regex.captures(input) else {
          return Ok(input.to_string());
        };
        let Some(whole) = captures.get(0) else {
          return Ok(input.to_string());
        };
        let replacement = compute(&captures)?;
        Ok(format!(
          "{}{replacement}{}",
          &input[..whole.start()],
          &input[whole.end()..]
        ))
      }
    }
  }
}

/// Applies `replacers` in order.
///
/// In strict mode a pattern that is not found fails the whole patch; otherwise it is
/// skipped.
pub fn apply_replacers(
  input: &str,
  replacers: &[Replacer],
  strict: bool,
) -> anyhow::Result<String> {
  let mut output = input.to_string();

  for replacer in replacers {
    if !replacer.matches(&output) {
      if strict {
        return Err(anyhow!("Can't find replacer pattern {}", replacer.pattern));
      }
      debug!(pattern = %replacer.pattern, "source-patch: pattern not found");
      continue;
    }

    output = replacer.apply(&output)?;
  }

  Ok(output)
}

/// A set of replacers for one file, relative to the project root.
pub struct SourcePatch {
  pub file: PathBuf,
  pub replacers: Vec<Replacer>,
}

impl SourcePatch {
  /// Patches the file in place. Returns whether it changed.
  pub fn apply(
    &self,
    fs: &dyn FileSystem,
    project_root: &Path,
    strict: bool,
  ) -> anyhow::Result<bool> {
    let path = project_root.join(&self.file);
    let input = fs
      .read_to_string(&path)
      .with_context(|| format!("Failed to read {}", path.display()))?;

    let output = apply_replacers(&input, &self.replacers, strict)
      .with_context(|| format!("Failed to patch {}", path.display()))?;

    if output == input {
      return Ok(false);
    }

    fs.write(&path, output.as_bytes())?;
    info!(path = %path.display(), "source-patch: file patched");
    Ok(true)
  }
}

fn dcloudio_file(file: &str) -> PathBuf {
  Path::new(DCLOUDIO_DIR).join(file)
}

/// Makes `$refs` lookups of async components tolerate components that are not loaded
/// yet, and reports missing refs to `vm.$onHandleMissingVueRef`.
pub fn select_component_ref_patch() -> anyhow::Result<SourcePatch> {
  Ok(SourcePatch {
    file: dcloudio_file("uni-mp-weixin/dist/index.js"),
    replacers: vec![
      Replacer::regex(
        r"const components = mpInstance\.selectAllComponents\(selector\)( \|\| \[\])?;",
        "const components = (mpInstance.selectAllComponents(selector) || []).filter(Boolean);",
      )?,
      Replacer::literal(
        "component.selectAllComponents('.scoped-ref').forEach(",
        "(component.selectAllComponents('.scoped-ref') || []).filter(Boolean).forEach(",
      ),
      Replacer::regex(
        concat!(
          r"const forComponents = mpInstance\.selectAllComponents",
          r"\('\.vue-ref-in-for'\)( \|\| \[\])?;"
        ),
        concat!(
          "const forComponents = ",
          "(mpInstance.selectAllComponents('.vue-ref-in-for') || []).filter(Boolean);"
        ),
      )?,
      Replacer::computed(
        r"return (?P<old_return>syncRefs\(refs, \$refs\)|\$refs)",
        |captures| {
          let old_return = captures
            .name("old_return")
            .ok_or_else(|| anyhow!("patch Vue.$ref fail, missing old return value"))?;
          Ok(refs_proxy(old_return.as_str()))
        },
      )?,
    ],
  })
}

fn refs_proxy(old_return: &str) -> String {
  format!(
    r#"
      return new Proxy({old_return}, {{
        get(target, prop) {{
          if (prop === '__original$refs__') {{
            return target;
          }}

          if (!target[prop]) {{
            vm?.$onHandleMissingVueRef?.(prop);
          }}

          return target[prop];
        }}
      }});"#
  )
}

/// Names generated component chunks by their index and passes the name as an array.
pub fn generate_component_patch() -> SourcePatch {
  SourcePatch {
    file: dcloudio_file("webpack-uni-mp-loader/lib/plugin/generate-component.js"),
    replacers: vec![
      Replacer::literal(
        "const chunkName = name.replace('.js', '-create-component')",
        "const chunkName = `_mp$c_${curComponents.length}`",
      ),
      Replacer::literal("'${chunkName}',", "['${chunkName}'],"),
    ],
  }
}

/// Wraps the framework's dynamic import of local components in remove markers.
///
/// The host cannot run component constructors from another bundle, so the import only
/// keeps the lazy dependency and the call itself is dropped at rewrite time.
pub fn local_component_patch() -> SourcePatch {
  SourcePatch {
    file: dcloudio_file("webpack-uni-mp-loader/lib/babel/plugin-dynamic-import.js"),
    replacers: vec![Replacer::literal(
      concat!(
        "'var IMPORT_NAME = function()",
        "{require.ensure([],()=>resolve(require(IMPORT_SOURCE)),CHUNK_NAME)}'"
      ),
      format!(
        "'var IMPORT_NAME = function(){{ {REMOVE_BEGIN_MARKER}; {}; {REMOVE_END_MARKER}; }}'",
        "require.ensure([],()=>void(require(IMPORT_SOURCE)),CHUNK_NAME)"
      ),
    )],
  }
}

pub fn builtin_patches() -> anyhow::Result<Vec<SourcePatch>> {
  Ok(vec![
    select_component_ref_patch()?,
    generate_component_patch(),
    local_component_patch(),
  ])
}
